//! The extensibility hook: factories declared in the configuration graph.

use std::sync::Arc;

use crate::descriptor::{ObjectKind, TypeDescriptor};
use crate::graph::Graph;
use crate::node::Node;
use crate::resolver::Resolver;
use crate::vocab;

use super::{FactoryDescriptor, FactoryHandle, FactoryResult, ObjectFactory};

/// Builds [`FactoryHandle`]s for nodes whose type names a registered
/// factory constructor.
///
/// The constructor is looked up by the requested type name first, then by the
/// node's own `cfg:type`. An unknown name is reported as "not applicable".
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectFactoryFactory;

impl ObjectFactory for ObjectFactoryFactory {
    fn descriptor(&self) -> FactoryDescriptor {
        FactoryDescriptor::of::<Self>()
    }

    fn can_produce(&self, target: &TypeDescriptor) -> bool {
        target.is(ObjectKind::ObjectFactory)
    }

    fn try_produce(
        &self,
        resolver: &mut Resolver,
        graph: &Graph,
        node: &Node,
        target: &TypeDescriptor,
    ) -> FactoryResult {
        let values = resolver.values(graph);
        let constructor = resolver.factory_constructor(target.name()).or_else(|| {
            values
                .string(node, vocab::PROP_TYPE)
                .and_then(|name| resolver.factory_constructor(&name))
        });
        let Some(constructor) = constructor else {
            return Ok(None);
        };

        let factory = constructor(&values, node)?;
        tracing::debug!(
            node = %node,
            factory = factory.descriptor().name(),
            "constructed graph-declared factory"
        );
        Ok(Some(Arc::new(FactoryHandle::from(factory))))
    }
}
