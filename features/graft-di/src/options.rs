use crate::factories::Constructor;

/// The order in which constructors of an implementation are tried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConstructorOrder {
    /// Constructors with more parameters first, ties keep declaration order
    #[default]
    MostParametersFirst,
    /// Constructors in the order they were declared
    DeclarationOrder,
}
impl ConstructorOrder {
    pub(crate) fn arrange<'a>(&self, constructors: &'a [Constructor]) -> Vec<&'a Constructor> {
        let mut arranged: Vec<_> = constructors.iter().collect();
        if *self == ConstructorOrder::MostParametersFirst {
            // sort_by_key is stable
            arranged.sort_by_key(|c| std::cmp::Reverse(c.parameters().len()));
        }
        arranged
    }
}

/// Policies of a [Resolver](crate::Resolver)
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    pub constructor_order: ConstructorOrder,
}
impl ResolverOptions {
    pub fn constructor_order(mut self, order: ConstructorOrder) -> Self {
        self.constructor_order = order;
        self
    }
}
