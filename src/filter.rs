//! Search filter algebra.
//!
//! Filters are immutable trees of comparisons and logical operators which
//! render to the textual RFC4515 representation consumed by the server, e.g.
//! `(&(objectClass=Group)(member=CN=x))`. Sub-trees are shared by reference
//! when reused in a bigger filter.
//!
//! Names and values are rendered as given; checking them against the
//! directory schema is left to the server.


use std::fmt;
use std::slice;
use std::sync::Arc;


#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ComparisonOperator {
    EqualTo,
    Proximity,
    LessThan,
    LessThanEqualTo,
    GreaterThan,
    GreaterThanEqualTo,
}
impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EqualTo => "=",
            Self::Proximity => "~=",
            Self::LessThan => "<",
            Self::LessThanEqualTo => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqualTo => ">=",
        }
    }
}
impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}
impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Not => "!",
        }
    }
}
impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[derive(Debug, Eq, Hash, PartialEq)]
enum FilterNode {
    Comparison {
        operator: ComparisonOperator,
        attribute_name: String,
        attribute_value: String,
    },
    And(Vec<SearchFilter>),
    Or(Vec<SearchFilter>),
    Not(SearchFilter),
}


/// An immutable search filter.
///
/// Cloning is cheap and shares the underlying tree.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SearchFilter {
    node: Arc<FilterNode>,
}
impl SearchFilter {
    fn from_node(node: FilterNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    pub fn comparison<N: Into<String>, V: Into<String>>(operator: ComparisonOperator, attribute_name: N, attribute_value: V) -> Self {
        Self::from_node(FilterNode::Comparison {
            operator,
            attribute_name: attribute_name.into(),
            attribute_value: attribute_value.into(),
        })
    }

    pub fn equal_to<N: Into<String>, V: Into<String>>(attribute_name: N, attribute_value: V) -> Self {
        Self::comparison(ComparisonOperator::EqualTo, attribute_name, attribute_value)
    }

    pub fn proximity<N: Into<String>, V: Into<String>>(attribute_name: N, attribute_value: V) -> Self {
        Self::comparison(ComparisonOperator::Proximity, attribute_name, attribute_value)
    }

    pub fn less_than<N: Into<String>, V: Into<String>>(attribute_name: N, attribute_value: V) -> Self {
        Self::comparison(ComparisonOperator::LessThan, attribute_name, attribute_value)
    }

    pub fn less_than_equal_to<N: Into<String>, V: Into<String>>(attribute_name: N, attribute_value: V) -> Self {
        Self::comparison(ComparisonOperator::LessThanEqualTo, attribute_name, attribute_value)
    }

    pub fn greater_than<N: Into<String>, V: Into<String>>(attribute_name: N, attribute_value: V) -> Self {
        Self::comparison(ComparisonOperator::GreaterThan, attribute_name, attribute_value)
    }

    pub fn greater_than_equal_to<N: Into<String>, V: Into<String>>(attribute_name: N, attribute_value: V) -> Self {
        Self::comparison(ComparisonOperator::GreaterThanEqualTo, attribute_name, attribute_value)
    }

    /// Conjunction of the operands.
    ///
    /// Without operands this renders as `(&)`; how the server interprets
    /// that is up to the server.
    pub fn and<I: IntoIterator<Item = SearchFilter>>(operands: I) -> Self {
        Self::from_node(FilterNode::And(operands.into_iter().collect()))
    }

    /// Disjunction of the operands; renders as `(|)` without operands.
    pub fn or<I: IntoIterator<Item = SearchFilter>>(operands: I) -> Self {
        Self::from_node(FilterNode::Or(operands.into_iter().collect()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: SearchFilter) -> Self {
        Self::from_node(FilterNode::Not(operand))
    }

    pub fn is_comparison(&self) -> bool {
        matches!(&*self.node, FilterNode::Comparison { .. })
    }

    pub fn comparison_operator(&self) -> Option<ComparisonOperator> {
        match &*self.node {
            FilterNode::Comparison { operator, .. } => Some(*operator),
            _ => None,
        }
    }

    pub fn logical_operator(&self) -> Option<LogicalOperator> {
        match &*self.node {
            FilterNode::Comparison { .. } => None,
            FilterNode::And(_) => Some(LogicalOperator::And),
            FilterNode::Or(_) => Some(LogicalOperator::Or),
            FilterNode::Not(_) => Some(LogicalOperator::Not),
        }
    }

    pub fn attribute_name(&self) -> Option<&str> {
        match &*self.node {
            FilterNode::Comparison { attribute_name, .. } => Some(attribute_name.as_str()),
            _ => None,
        }
    }

    pub fn attribute_value(&self) -> Option<&str> {
        match &*self.node {
            FilterNode::Comparison { attribute_value, .. } => Some(attribute_value.as_str()),
            _ => None,
        }
    }

    /// The operands of a logical filter; empty for comparisons.
    pub fn operands(&self) -> &[SearchFilter] {
        match &*self.node {
            FilterNode::Comparison { .. } => &[],
            FilterNode::And(operands) => operands.as_slice(),
            FilterNode::Or(operands) => operands.as_slice(),
            FilterNode::Not(operand) => slice::from_ref(operand),
        }
    }

    pub fn filter_string(&self) -> String {
        self.to_string()
    }

    /// Whether both filters share the very same tree.
    pub fn ptr_eq(&self, other: &SearchFilter) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}
impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node {
            FilterNode::Comparison { operator, attribute_name, attribute_value } => {
                write!(f, "({}{}{})", attribute_name, operator, attribute_value)
            },
            FilterNode::And(operands) => write_logical(f, LogicalOperator::And, operands),
            FilterNode::Or(operands) => write_logical(f, LogicalOperator::Or, operands),
            FilterNode::Not(operand) => write_logical(f, LogicalOperator::Not, slice::from_ref(operand)),
        }
    }
}

fn write_logical(f: &mut fmt::Formatter<'_>, operator: LogicalOperator, operands: &[SearchFilter]) -> fmt::Result {
    write!(f, "({}", operator)?;
    for operand in operands {
        write!(f, "{}", operand)?;
    }
    f.write_str(")")
}


#[cfg(test)]
mod tests {
    use super::{ComparisonOperator, LogicalOperator, SearchFilter};

    #[test]
    fn test_comparisons() {
        assert_eq!(SearchFilter::equal_to("cn", "admin").filter_string(), "(cn=admin)");
        assert_eq!(SearchFilter::proximity("sn", "Smith").filter_string(), "(sn~=Smith)");
        assert_eq!(SearchFilter::less_than("uidNumber", "100").filter_string(), "(uidNumber<100)");
        assert_eq!(SearchFilter::less_than_equal_to("uidNumber", "100").filter_string(), "(uidNumber<=100)");
        assert_eq!(SearchFilter::greater_than("logonCount", "0").filter_string(), "(logonCount>0)");
        assert_eq!(SearchFilter::greater_than_equal_to("logonCount", "5").filter_string(), "(logonCount>=5)");
    }

    #[test]
    fn test_membership_filter() {
        let filter = SearchFilter::and([
            SearchFilter::equal_to("objectClass", "Group"),
            SearchFilter::equal_to("member", "CN=x"),
        ]);
        assert_eq!(filter.filter_string(), "(&(objectClass=Group)(member=CN=x))");
        assert_eq!(filter.logical_operator(), Some(LogicalOperator::And));
        assert_eq!(filter.operands().len(), 2);
        assert_eq!(filter.operands()[1].attribute_value(), Some("CN=x"));
    }

    #[test]
    fn test_not() {
        let filter = SearchFilter::not(SearchFilter::equal_to("cn", "admin"));
        assert_eq!(filter.filter_string(), "(!(cn=admin))");
        assert_eq!(filter.operands().len(), 1);
        assert!(!filter.is_comparison());
    }

    #[test]
    fn test_empty_groups() {
        assert_eq!(SearchFilter::and(Vec::<SearchFilter>::new()).filter_string(), "(&)");
        assert_eq!(SearchFilter::or(Vec::<SearchFilter>::new()).filter_string(), "(|)");
    }

    #[test]
    fn test_nested_rendering_is_stable() {
        let people = SearchFilter::or([
            SearchFilter::equal_to("objectClass", "person"),
            SearchFilter::equal_to("objectClass", "inetOrgPerson"),
        ]);
        let filter = SearchFilter::and([
            people.clone(),
            SearchFilter::not(SearchFilter::equal_to("userAccountControl", "514")),
            people.clone(),
        ]);

        let expected = "(&(|(objectClass=person)(objectClass=inetOrgPerson))(!(userAccountControl=514))(|(objectClass=person)(objectClass=inetOrgPerson)))";
        assert_eq!(filter.filter_string(), expected);
        assert_eq!(filter.filter_string(), expected);
        assert_eq!(format!("{}", filter), expected);

        // reused sub-trees are shared and stay untouched
        assert!(filter.operands()[0].ptr_eq(&people));
        assert!(filter.operands()[2].ptr_eq(&people));
        assert_eq!(people.filter_string(), "(|(objectClass=person)(objectClass=inetOrgPerson))");
    }

    #[test]
    fn test_accessors() {
        let filter = SearchFilter::comparison(ComparisonOperator::GreaterThanEqualTo, "pwdLastSet", "1");
        assert!(filter.is_comparison());
        assert_eq!(filter.comparison_operator(), Some(ComparisonOperator::GreaterThanEqualTo));
        assert_eq!(filter.logical_operator(), None);
        assert_eq!(filter.attribute_name(), Some("pwdLastSet"));
        assert_eq!(filter.attribute_value(), Some("1"));
        assert!(filter.operands().is_empty());
        assert_eq!(ComparisonOperator::Proximity.to_string(), "~=");
    }
}
