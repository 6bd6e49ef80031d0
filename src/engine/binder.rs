//! Service binding: attach configured services to loaded descriptors.
//!
//! # Responsibilities
//! - For every service named in the response configuration, find its
//!   descriptor in the flattened index
//! - Produce the bound table the transport routes calls through
//!
//! # Design Decisions
//! - Lookup is a direct map hit on the fully-qualified name; there is no
//!   runtime namespace traversal
//! - An unresolvable service name is logged and skipped; remaining services
//!   still bind
//! - All of a bound service's methods are attached, so a call to a declared
//!   method without a rule surfaces as a resolution gap, not a routing miss

use std::collections::HashMap;

use prost_reflect::{MethodDescriptor, ServiceDescriptor};

use crate::responses::ResponseMap;
use crate::schemas::DescriptorIndex;

/// One service attached to the transport.
#[derive(Debug, Clone)]
pub struct BoundService {
    pub descriptor: ServiceDescriptor,
    /// Method name -> descriptor, for request/response codecs.
    pub methods: HashMap<String, MethodDescriptor>,
}

/// The listener's live service table.
#[derive(Debug, Clone, Default)]
pub struct BoundTable {
    services: HashMap<String, BoundService>,
}

impl BoundTable {
    /// Look up the method descriptor for an incoming call path.
    pub fn lookup(&self, service: &str, method: &str) -> Option<&MethodDescriptor> {
        self.services.get(service)?.methods.get(method)
    }

    /// True when the given service is bound.
    pub fn contains_service(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    /// Number of bound services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Build the bound table for every configured service that resolves against
/// the descriptor index.
pub fn bind(index: &DescriptorIndex, responses: &ResponseMap) -> BoundTable {
    let mut services = HashMap::new();

    for service_name in responses.keys() {
        let Some(descriptor) = index.get(service_name) else {
            tracing::warn!(
                service = %service_name,
                "Service configured but not found in any loaded schema, skipping"
            );
            continue;
        };

        let methods: HashMap<String, MethodDescriptor> = descriptor
            .methods()
            .map(|m| (m.name().to_string(), m))
            .collect();

        tracing::debug!(
            service = %service_name,
            methods = methods.len(),
            "Bound service"
        );
        // Map insert keeps re-binding idempotent.
        services.insert(
            service_name.clone(),
            BoundService {
                descriptor: descriptor.clone(),
                methods,
            },
        );
    }

    BoundTable { services }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::rule::MethodRule;
    use crate::schemas::SchemaRegistry;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::fs;

    const GREETER: &str = r#"
        syntax = "proto3";
        package pkg;
        service Greeter {
            rpc SayHello (HelloRequest) returns (HelloReply);
            rpc SayGoodbye (HelloRequest) returns (HelloReply);
        }
        message HelloRequest { string name = 1; }
        message HelloReply { string message = 1; }
    "#;

    fn responses_for(service: &str) -> ResponseMap {
        let mut methods = BTreeMap::new();
        methods.insert(
            "SayHello".to_string(),
            MethodRule::default_response(json!({"message": "hi"})),
        );
        let mut map = ResponseMap::new();
        map.insert(service.to_string(), methods);
        map
    }

    #[test]
    fn binds_configured_service_with_all_methods() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("greeter.proto"), GREETER).unwrap();
        let registry = SchemaRegistry::new(dir.path());
        registry.load().unwrap();

        let table = bind(&registry.snapshot(), &responses_for("pkg.Greeter"));
        assert_eq!(table.len(), 1);
        assert!(table.lookup("pkg.Greeter", "SayHello").is_some());
        // Declared but unconfigured methods are still routable.
        assert!(table.lookup("pkg.Greeter", "SayGoodbye").is_some());
        assert!(table.lookup("pkg.Greeter", "Missing").is_none());
    }

    #[test]
    fn unresolvable_service_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("greeter.proto"), GREETER).unwrap();
        let registry = SchemaRegistry::new(dir.path());
        registry.load().unwrap();

        let mut responses = responses_for("pkg.Greeter");
        responses.append(&mut responses_for("ghost.Service"));

        let table = bind(&registry.snapshot(), &responses);
        assert_eq!(table.len(), 1);
        assert!(table.contains_service("pkg.Greeter"));
        assert!(!table.contains_service("ghost.Service"));
    }
}
