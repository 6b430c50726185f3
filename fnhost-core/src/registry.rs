// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Function registry keyed by validated function name.
//!
//! The registry is built once while the host starts up, shared through an
//! `Arc`, and only read once requests are being served. Registering a name
//! twice replaces the earlier entry.

use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::InvalidNameError;
use crate::function::{CloudEventFunction, HttpFunction, RegisteredFunction, UserFunction};
use crate::typed::{TypedDispatcher, TypedFunction, TypedOptions};
use crate::types::{FunctionName, SignatureType};

/// Registry of user functions.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: DashMap<FunctionName, RegisteredFunction>,
}

impl FunctionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            functions: DashMap::new(),
        }
    }

    /// Create a registry wrapped in an Arc for sharing across tasks.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a function under `name`, replacing any previous entry.
    ///
    /// The name is validated before anything is stored.
    pub fn register(
        &self,
        name: &str,
        signature_type: SignatureType,
        user_function: UserFunction,
    ) -> Result<(), InvalidNameError> {
        let name = FunctionName::new(name)?;

        let entry = RegisteredFunction::new(signature_type, user_function);
        if let Some(previous) = self.functions.insert(name.clone(), entry) {
            tracing::debug!(
                function = %name,
                previous = %previous.signature_type,
                signature = %signature_type,
                "Replaced registered function"
            );
        } else {
            tracing::debug!(function = %name, signature = %signature_type, "Registered function");
        }

        Ok(())
    }

    /// Register a raw request/response function.
    pub fn http(
        &self,
        name: &str,
        handler: impl HttpFunction + 'static,
    ) -> Result<(), InvalidNameError> {
        self.register(name, SignatureType::Http, UserFunction::Http(Arc::new(handler)))
    }

    /// Register a CloudEvent function.
    pub fn cloud_event(
        &self,
        name: &str,
        handler: impl CloudEventFunction + 'static,
    ) -> Result<(), InvalidNameError> {
        self.register(
            name,
            SignatureType::CloudEvent,
            UserFunction::CloudEvent(Arc::new(handler)),
        )
    }

    /// Register a typed function using the JSON format.
    pub fn typed<I, O>(
        &self,
        name: &str,
        handler: impl TypedFunction<I, O> + 'static,
    ) -> Result<(), InvalidNameError>
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
    {
        self.typed_with(name, TypedOptions::new(handler))
    }

    /// Register a typed function with explicit options.
    pub fn typed_with<I, O>(
        &self,
        name: &str,
        options: TypedOptions<I, O>,
    ) -> Result<(), InvalidNameError>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        let dispatcher = TypedDispatcher::new(options);
        self.register(name, SignatureType::Typed, UserFunction::Http(Arc::new(dispatcher)))
    }

    /// Look up a function. Unknown or malformed names yield `None`.
    pub fn lookup(&self, name: &str) -> Option<RegisteredFunction> {
        self.functions.get(name).map(|entry| entry.value().clone())
    }

    /// Alias of [`FunctionRegistry::lookup`] for the invoking runtime.
    pub fn get_registered_function(&self, name: &str) -> Option<RegisteredFunction> {
        self.lookup(name)
    }

    /// Check if a function exists.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Get the number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names with their signature kinds, sorted by name.
    pub fn signatures(&self) -> Vec<(FunctionName, SignatureType)> {
        let mut signatures: Vec<_> = self
            .functions
            .iter()
            .map(|r| (r.key().clone(), r.value().signature_type))
            .collect();
        signatures.sort_by(|a, b| a.0.cmp(&b.0));
        signatures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::invocation::{Request, Response};

    fn text_function(body: &'static str) -> impl HttpFunction {
        move |_req: Request, res: Response| async move { res.send(200, "text/plain", body).await }
    }

    async fn call(registry: &FunctionRegistry, name: &str) -> Vec<u8> {
        let entry = registry.lookup(name).unwrap();
        let res = Response::new();
        entry
            .invoke(Request::new("GET", "/"), res.clone())
            .await
            .unwrap();
        res.snapshot().await.body
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = FunctionRegistry::new();
        registry.http("hello", text_function("hi")).unwrap();

        let entry = registry.lookup("hello").unwrap();
        assert_eq!(entry.signature_type, SignatureType::Http);
        assert_eq!(call(&registry, "hello").await, b"hi");
        assert!(registry.contains("hello"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_name_leaves_registry_untouched() {
        let registry = FunctionRegistry::new();

        for name in ["", "1abc", "has space", "trailing-", "a".repeat(64).as_str()] {
            let err = registry.http(name, text_function("x")).unwrap_err();
            assert_eq!(err.name, name);
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_reregistration_overwrites() {
        let registry = FunctionRegistry::new();
        registry.http("fn", text_function("first")).unwrap();
        registry
            .typed("fn", |x: i64| async move { Ok::<_, HandlerError>(x) })
            .unwrap();
        registry.http("fn", text_function("second")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.lookup("fn").unwrap().signature_type,
            SignatureType::Http
        );
        assert_eq!(call(&registry, "fn").await, b"second");
    }

    #[test]
    fn test_lookup_missing() {
        let registry = FunctionRegistry::new();
        assert!(registry.lookup("missing").is_none());
        assert!(registry.get_registered_function("not a name!").is_none());
    }

    #[test]
    fn test_signatures_sorted() {
        let registry = FunctionRegistry::new();
        registry
            .typed("zeta", |x: i64| async move { Ok::<_, HandlerError>(x) })
            .unwrap();
        registry
            .cloud_event("alpha", |_e: crate::CloudEvent| async move {
                Ok::<(), HandlerError>(())
            })
            .unwrap();

        let signatures: Vec<_> = registry
            .signatures()
            .into_iter()
            .map(|(name, kind)| (name.to_string(), kind))
            .collect();
        assert_eq!(
            signatures,
            vec![
                ("alpha".to_string(), SignatureType::CloudEvent),
                ("zeta".to_string(), SignatureType::Typed),
            ]
        );
    }

    #[test]
    fn test_concurrent_registration() {
        use std::thread;

        let registry = FunctionRegistry::new_shared();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    reg.http(&format!("func-{}", i), text_function("x")).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 10);
    }
}
