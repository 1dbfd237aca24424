/// The base capability set for any value in a variable's domain.
///
/// Equality and hashing drive duplicate detection and consistent-domain
/// intersection; `Debug` is what stringification prints, so a type that
/// cannot be rendered is rejected at compile time rather than at run time.
pub trait Value: Clone + std::fmt::Debug + Eq + std::hash::Hash + 'static {}
impl<T> Value for T where T: Clone + std::fmt::Debug + Eq + std::hash::Hash + 'static {}

/// A capability trait for values that admit a total order.
///
/// Ordered values unlock sorted domain storage with binary-search lookups;
/// see [`Variable::with_sorted_domain`](crate::csp::Variable::with_sorted_domain).
pub trait OrderedValue: Value + Ord {}
impl<T> OrderedValue for T where T: Value + Ord {}
