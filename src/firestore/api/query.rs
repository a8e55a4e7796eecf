use std::fmt;
use std::str::FromStr;

use crate::firestore::error::{invalid_argument, FirestoreError, FirestoreResult};
use crate::firestore::model::{DocumentKey, FieldPath, IntoFieldPath, ResourcePath};
use crate::firestore::value::{values_equal, FirestoreValue};

use super::cursor::{bound_from_arguments, CursorArgument, CursorMethod};
use super::snapshot::DocumentSnapshot;
use super::Firestore;

/// Comparison operators accepted by `where` filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
    ArrayContainsAny,
    In,
    NotIn,
}

impl FilterOperator {
    /// The operator name used by the REST `StructuredQuery` encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FilterOperator::Equal => "EQUAL",
            FilterOperator::NotEqual => "NOT_EQUAL",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FilterOperator::ArrayContains => "ARRAY_CONTAINS",
            FilterOperator::ArrayContainsAny => "ARRAY_CONTAINS_ANY",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT_IN",
        }
    }

    /// The operator as written in a `where()` call, e.g. `"array-contains"`.
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::LessThan => "<",
            FilterOperator::LessThanOrEqual => "<=",
            FilterOperator::Equal => "==",
            FilterOperator::NotEqual => "!=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterThanOrEqual => ">=",
            FilterOperator::ArrayContains => "array-contains",
            FilterOperator::ArrayContainsAny => "array-contains-any",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not-in",
        }
    }

    pub fn is_inequality(&self) -> bool {
        matches!(
            self,
            FilterOperator::LessThan
                | FilterOperator::LessThanOrEqual
                | FilterOperator::GreaterThan
                | FilterOperator::GreaterThanOrEqual
                | FilterOperator::NotEqual
                | FilterOperator::NotIn
        )
    }
}

impl FromStr for FilterOperator {
    type Err = FirestoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let operator = match value {
            "<" => FilterOperator::LessThan,
            "<=" => FilterOperator::LessThanOrEqual,
            "==" => FilterOperator::Equal,
            "!=" => FilterOperator::NotEqual,
            ">" => FilterOperator::GreaterThan,
            ">=" => FilterOperator::GreaterThanOrEqual,
            "array-contains" => FilterOperator::ArrayContains,
            "array-contains-any" => FilterOperator::ArrayContainsAny,
            "in" => FilterOperator::In,
            "not-in" => FilterOperator::NotIn,
            other => {
                return Err(invalid_argument(format!(
                    "Invalid operator '{other}'. Expected one of '<', '<=', '==', '!=', '>', '>=', 'array-contains', 'array-contains-any', 'in', 'not-in'."
                )))
            }
        };
        Ok(operator)
    }
}

/// Accepts either a typed [`FilterOperator`] or its textual form.
pub trait IntoFilterOperator {
    fn into_filter_operator(self) -> FirestoreResult<FilterOperator>;
}

impl IntoFilterOperator for FilterOperator {
    fn into_filter_operator(self) -> FirestoreResult<FilterOperator> {
        Ok(self)
    }
}

impl<'a> IntoFilterOperator for &'a str {
    fn into_filter_operator(self) -> FirestoreResult<FilterOperator> {
        self.parse()
    }
}

impl IntoFilterOperator for String {
    fn into_filter_operator(self) -> FirestoreResult<FilterOperator> {
        self.parse()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "ASCENDING",
            OrderDirection::Descending => "DESCENDING",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            OrderDirection::Ascending => OrderDirection::Descending,
            OrderDirection::Descending => OrderDirection::Ascending,
        }
    }
}

impl FromStr for OrderDirection {
    type Err = FirestoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(OrderDirection::Ascending),
            "desc" => Ok(OrderDirection::Descending),
            other => Err(invalid_argument(format!(
                "Invalid direction '{other}'. Expected 'asc' or 'desc'."
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LimitType {
    #[default]
    First,
    Last,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    field: FieldPath,
    operator: FilterOperator,
    value: FirestoreValue,
}

impl FieldFilter {
    pub fn new(field: FieldPath, operator: FilterOperator, value: FirestoreValue) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> &FirestoreValue {
        &self.value
    }

    fn same_as(&self, other: &FieldFilter) -> bool {
        self.field == other.field
            && self.operator == other.operator
            && values_equal(&self.value, &other.value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderBy {
    field: FieldPath,
    direction: OrderDirection,
}

impl OrderBy {
    pub fn new(field: FieldPath, direction: OrderDirection) -> Self {
        Self { field, direction }
    }

    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }

    fn flipped(&self) -> Self {
        Self::new(self.field.clone(), self.direction.flipped())
    }
}

/// A pagination boundary: values aligned positionally with the query's
/// ordering, plus whether documents equal to the boundary are included.
#[derive(Clone, Debug, PartialEq)]
pub struct Bound {
    values: Vec<FirestoreValue>,
    inclusive: bool,
}

impl Bound {
    pub fn new(values: Vec<FirestoreValue>, inclusive: bool) -> Self {
        Self { values, inclusive }
    }

    pub fn values(&self) -> &[FirestoreValue] {
        &self.values
    }

    pub fn inclusive(&self) -> bool {
        self.inclusive
    }

    fn same_as(&self, other: &Bound) -> bool {
        self.inclusive == other.inclusive
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(l, r)| values_equal(l, r))
    }
}

/// Everything that determines which documents a query returns, independent
/// of the database instance it runs against.
#[derive(Clone, Debug)]
pub struct QueryDefinition {
    collection_path: ResourcePath,
    filters: Vec<FieldFilter>,
    explicit_order_by: Vec<OrderBy>,
    limit: Option<u32>,
    limit_type: LimitType,
    start_at: Option<Bound>,
    end_at: Option<Bound>,
}

impl QueryDefinition {
    pub(crate) fn new(collection_path: ResourcePath) -> Self {
        Self {
            collection_path,
            filters: Vec::new(),
            explicit_order_by: Vec::new(),
            limit: None,
            limit_type: LimitType::First,
            start_at: None,
            end_at: None,
        }
    }

    pub fn collection_path(&self) -> &ResourcePath {
        &self.collection_path
    }

    pub fn collection_id(&self) -> &str {
        self.collection_path.last_segment().unwrap_or_default()
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    /// The order-by clauses in the order they were added.
    pub fn explicit_order_by(&self) -> &[OrderBy] {
        &self.explicit_order_by
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn limit_type(&self) -> LimitType {
        self.limit_type
    }

    pub fn start_at(&self) -> Option<&Bound> {
        self.start_at.as_ref()
    }

    pub fn end_at(&self) -> Option<&Bound> {
        self.end_at.as_ref()
    }

    pub(crate) fn matches_collection(&self, key: &DocumentKey) -> bool {
        key.collection_path() == self.collection_path
    }

    /// The full ordering applied to results.
    ///
    /// Starts with the explicit clauses. Without any, the first inequality
    /// filter field is ordered ascending. The document key is always the
    /// final tie-breaker, using the direction of the last clause.
    pub fn normalized_order_by(&self) -> Vec<OrderBy> {
        let mut order_by = self.explicit_order_by.clone();
        if order_by.is_empty() {
            if let Some(field) = self.first_inequality_field() {
                order_by.push(OrderBy::new(field.clone(), OrderDirection::Ascending));
            }
        }
        if !order_by.iter().any(|order| order.field.is_key_field()) {
            let direction = order_by
                .last()
                .map(OrderBy::direction)
                .unwrap_or_default();
            order_by.push(OrderBy::new(FieldPath::document_id(), direction));
        }
        order_by
    }

    pub(crate) fn result_order_by(&self) -> Vec<OrderBy> {
        self.normalized_order_by()
    }

    pub(crate) fn result_start_at(&self) -> Option<&Bound> {
        self.start_at.as_ref()
    }

    pub(crate) fn result_end_at(&self) -> Option<&Bound> {
        self.end_at.as_ref()
    }

    /// Ordering sent to the backend; `limit_to_last` queries run reversed.
    pub(crate) fn request_order_by(&self) -> Vec<OrderBy> {
        let order_by = self.normalized_order_by();
        match self.limit_type {
            LimitType::First => order_by,
            LimitType::Last => order_by.iter().map(OrderBy::flipped).collect(),
        }
    }

    pub(crate) fn request_start_at(&self) -> Option<&Bound> {
        match self.limit_type {
            LimitType::First => self.start_at.as_ref(),
            LimitType::Last => self.end_at.as_ref(),
        }
    }

    pub(crate) fn request_end_at(&self) -> Option<&Bound> {
        match self.limit_type {
            LimitType::First => self.end_at.as_ref(),
            LimitType::Last => self.start_at.as_ref(),
        }
    }

    /// Checks the rules that only apply once a query is about to run.
    pub(crate) fn validate_for_execution(&self) -> FirestoreResult<()> {
        if self.limit_type == LimitType::Last && self.explicit_order_by.is_empty() {
            return Err(invalid_argument(
                "limitToLast() queries require specifying at least one orderBy() clause",
            ));
        }
        Ok(())
    }

    fn first_inequality_field(&self) -> Option<&FieldPath> {
        self.filters
            .iter()
            .find(|filter| filter.operator.is_inequality())
            .map(FieldFilter::field)
    }

    fn with_filter(&self, filter: FieldFilter) -> FirestoreResult<Self> {
        // The first inequality field becomes the implicit ordering when no
        // orderBy() is set, which would misalign an existing cursor.
        let adds_implicit_order = self.explicit_order_by.is_empty()
            && filter.operator.is_inequality()
            && self.first_inequality_field().is_none();
        if adds_implicit_order {
            if self.start_at.is_some() {
                return Err(invalid_argument(
                    "Invalid query. You must not call startAt() or startAfter() before calling where() with an inequality filter unless orderBy() is set.",
                ));
            }
            if self.end_at.is_some() {
                return Err(invalid_argument(
                    "Invalid query. You must not call endAt() or endBefore() before calling where() with an inequality filter unless orderBy() is set.",
                ));
            }
        }
        let mut next = self.clone();
        next.filters.push(filter);
        Ok(next)
    }

    fn with_order_by(&self, order: OrderBy) -> FirestoreResult<Self> {
        if self.start_at.is_some() {
            return Err(invalid_argument(
                "Invalid query. You must not call startAt() or startAfter() before calling orderBy().",
            ));
        }
        if self.end_at.is_some() {
            return Err(invalid_argument(
                "Invalid query. You must not call endAt() or endBefore() before calling orderBy().",
            ));
        }
        if self
            .explicit_order_by
            .iter()
            .any(|existing| existing.field == order.field)
        {
            return Err(invalid_argument(format!(
                "Invalid query. Order by clause for field '{}' already exists.",
                order.field
            )));
        }
        let mut next = self.clone();
        next.explicit_order_by.push(order);
        Ok(next)
    }

    fn with_limit(&self, limit: u32, limit_type: LimitType) -> FirestoreResult<Self> {
        if limit == 0 {
            let method = match limit_type {
                LimitType::First => "limit",
                LimitType::Last => "limitToLast",
            };
            return Err(invalid_argument(format!(
                "Function {method}() requires its first argument to be of type number and greater than 0, but it was: 0."
            )));
        }
        if let Some(previous) = self.limit {
            log::debug!("replacing limit {previous} ({:?}) with {limit} ({limit_type:?})", self.limit_type);
        }
        let mut next = self.clone();
        next.limit = Some(limit);
        next.limit_type = limit_type;
        Ok(next)
    }

    fn with_bound(&self, method: CursorMethod, bound: Bound) -> Self {
        let mut next = self.clone();
        let slot = if method.is_start() {
            &mut next.start_at
        } else {
            &mut next.end_at
        };
        if slot.is_some() {
            log::debug!("{}() replaces the existing cursor on {}", method.name(), self.collection_path);
        }
        *slot = Some(bound);
        next
    }

    /// Structural equality ignoring filter insertion order.
    ///
    /// Cheap checks (path, clause counts, limit presence) run first; only
    /// then are filters, orderings, limits and cursors compared in full.
    pub fn is_equal(&self, other: &QueryDefinition) -> bool {
        if self.collection_path != other.collection_path
            || self.filters.len() != other.filters.len()
            || self.explicit_order_by.len() != other.explicit_order_by.len()
            || self.limit.is_some() != other.limit.is_some()
        {
            return false;
        }

        filters_match(&self.filters, &other.filters)
            && self.explicit_order_by == other.explicit_order_by
            && self.limit_matches(other)
            && bounds_match(self.start_at.as_ref(), other.start_at.as_ref())
            && bounds_match(self.end_at.as_ref(), other.end_at.as_ref())
    }

    fn limit_matches(&self, other: &QueryDefinition) -> bool {
        match (self.limit, other.limit) {
            (None, None) => true,
            (Some(left), Some(right)) => left == right && self.limit_type == other.limit_type,
            _ => false,
        }
    }
}

impl PartialEq for QueryDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

fn filters_match(left: &[FieldFilter], right: &[FieldFilter]) -> bool {
    let mut used = vec![false; right.len()];
    left.iter().all(|filter| {
        let found = right
            .iter()
            .enumerate()
            .position(|(index, candidate)| !used[index] && filter.same_as(candidate));
        match found {
            Some(index) => {
                used[index] = true;
                true
            }
            None => false,
        }
    })
}

fn bounds_match(left: Option<&Bound>, right: Option<&Bound>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => left.same_as(right),
        _ => false,
    }
}

/// An immutable query over a single collection.
///
/// Every builder method returns a new `Query`; the receiver is never
/// modified, so a base query can be shared and extended freely.
#[derive(Clone, Debug)]
pub struct Query {
    firestore: Firestore,
    definition: QueryDefinition,
}

impl Query {
    pub(crate) fn new(firestore: Firestore, collection_path: ResourcePath) -> Self {
        Self {
            firestore,
            definition: QueryDefinition::new(collection_path),
        }
    }

    /// Returns the Firestore instance that created this query.
    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    pub fn collection_path(&self) -> &ResourcePath {
        self.definition.collection_path()
    }

    pub fn collection_id(&self) -> &str {
        self.definition.collection_id()
    }

    pub fn definition(&self) -> &QueryDefinition {
        &self.definition
    }

    fn derive(&self, definition: QueryDefinition) -> Self {
        Self {
            firestore: self.firestore.clone(),
            definition,
        }
    }

    /// Adds a `field <operator> value` filter.
    ///
    /// ```
    /// # use firestore_query::firestore::{Firestore, DatabaseId};
    /// let db = Firestore::new("[DEFAULT]", DatabaseId::default("demo"));
    /// let query = db.collection("firestore").unwrap().query();
    /// let filtered = query.where_field("foo", "==", "bar").unwrap();
    /// assert_eq!(filtered.definition().filters().len(), 1);
    /// assert!(query.definition().filters().is_empty());
    /// ```
    pub fn where_field(
        &self,
        field: impl IntoFieldPath,
        operator: impl IntoFilterOperator,
        value: impl Into<FirestoreValue>,
    ) -> FirestoreResult<Query> {
        let field = field.into_field_path()?;
        let operator = operator.into_filter_operator()?;
        let filter = FieldFilter::new(field, operator, value.into());
        let definition = self.definition.with_filter(filter)?;
        Ok(self.derive(definition))
    }

    /// Orders results by `field`, ascending when `direction` is `None`.
    /// Each field may be ordered at most once.
    pub fn order_by(
        &self,
        field: impl IntoFieldPath,
        direction: impl Into<Option<OrderDirection>>,
    ) -> FirestoreResult<Query> {
        let field = field.into_field_path()?;
        let direction = direction.into().unwrap_or_default();
        let definition = self.definition.with_order_by(OrderBy::new(field, direction))?;
        Ok(self.derive(definition))
    }

    /// Keeps only the first `limit` results, replacing any earlier limit.
    pub fn limit(&self, limit: u32) -> FirestoreResult<Query> {
        let definition = self.definition.with_limit(limit, LimitType::First)?;
        Ok(self.derive(definition))
    }

    /// Keeps only the last `limit` results, replacing any earlier limit.
    pub fn limit_to_last(&self, limit: u32) -> FirestoreResult<Query> {
        let definition = self.definition.with_limit(limit, LimitType::Last)?;
        Ok(self.derive(definition))
    }

    /// Starts results at the provided values or document (inclusive).
    pub fn start_at<I, A>(&self, arguments: I) -> FirestoreResult<Query>
    where
        I: IntoIterator<Item = A>,
        A: Into<CursorArgument>,
    {
        self.with_cursor(CursorMethod::StartAt, collect_arguments(arguments))
    }

    /// Starts results after the provided values or document (exclusive).
    pub fn start_after<I, A>(&self, arguments: I) -> FirestoreResult<Query>
    where
        I: IntoIterator<Item = A>,
        A: Into<CursorArgument>,
    {
        self.with_cursor(CursorMethod::StartAfter, collect_arguments(arguments))
    }

    /// Ends results at the provided values or document (inclusive).
    pub fn end_at<I, A>(&self, arguments: I) -> FirestoreResult<Query>
    where
        I: IntoIterator<Item = A>,
        A: Into<CursorArgument>,
    {
        self.with_cursor(CursorMethod::EndAt, collect_arguments(arguments))
    }

    /// Ends results before the provided values or document (exclusive).
    pub fn end_before<I, A>(&self, arguments: I) -> FirestoreResult<Query>
    where
        I: IntoIterator<Item = A>,
        A: Into<CursorArgument>,
    {
        self.with_cursor(CursorMethod::EndBefore, collect_arguments(arguments))
    }

    pub(crate) fn with_cursor(
        &self,
        method: CursorMethod,
        arguments: Vec<CursorArgument>,
    ) -> FirestoreResult<Query> {
        let bound = bound_from_arguments(&self.definition, method, arguments)?;
        Ok(self.derive(self.definition.with_bound(method, bound)))
    }

    /// Returns whether both queries come from the same database instance
    /// and describe the same filters, ordering, limit and cursors.
    pub fn is_equal(&self, other: &Query) -> bool {
        self.firestore == other.firestore && self.definition.is_equal(&other.definition)
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({}", self.definition.collection_path)?;
        for filter in &self.definition.filters {
            write!(f, ", where {} {} {:?}", filter.field, filter.operator.symbol(), filter.value.kind())?;
        }
        for order in &self.definition.explicit_order_by {
            write!(f, ", order by {} {}", order.field, order.direction.as_str())?;
        }
        if let Some(limit) = self.definition.limit {
            write!(f, ", limit {limit} ({:?})", self.definition.limit_type)?;
        }
        f.write_str(")")
    }
}

fn collect_arguments<I, A>(arguments: I) -> Vec<CursorArgument>
where
    I: IntoIterator<Item = A>,
    A: Into<CursorArgument>,
{
    arguments.into_iter().map(Into::into).collect()
}

/// The documents returned by executing a query.
#[derive(Clone, Debug)]
pub struct QuerySnapshot {
    query: Query,
    documents: Vec<DocumentSnapshot>,
}

impl QuerySnapshot {
    pub fn new(query: Query, documents: Vec<DocumentSnapshot>) -> Self {
        Self { query, documents }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Document ids in result order.
    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(DocumentSnapshot::id).collect()
    }
}

impl IntoIterator for QuerySnapshot {
    type Item = DocumentSnapshot;
    type IntoIter = std::vec::IntoIter<DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}
