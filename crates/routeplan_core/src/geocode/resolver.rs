//! Coordinate resolver.
//!
//! # Responsibility
//! - Turn one address into coordinates through an optional `Geocoder`.
//! - Collapse every non-success outcome into "unresolvable".
//!
//! # Invariants
//! - No retries; one provider call per `resolve`.
//! - Persisting the result is the caller's job.

use crate::model::stop::Coordinates;
use crate::provider::Geocoder;
use log::{debug, warn};
use std::sync::Arc;

/// Wraps an optional geocoding provider.
#[derive(Clone, Default)]
pub struct CoordinateResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl CoordinateResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder: Some(geocoder),
        }
    }

    /// A resolver that reports every address as unresolvable.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.geocoder.is_some()
    }

    /// Name of the backing provider, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.geocoder.as_deref().map(|geocoder| geocoder.provider_name())
    }

    /// Returns coordinates for `address`, or `None` when unresolvable.
    pub fn resolve(&self, address: &str) -> Option<Coordinates> {
        let geocoder = self.geocoder.as_deref()?;
        if address.trim().is_empty() {
            return None;
        }

        match geocoder.geocode(address) {
            Ok(Some(coordinates)) if coordinates.is_valid() => Some(coordinates),
            Ok(Some(_)) => {
                warn!(
                    "event=geocode module=geocode status=error provider={} error_code=out_of_range",
                    geocoder.provider_name()
                );
                None
            }
            Ok(None) => {
                debug!(
                    "event=geocode module=geocode status=no_match provider={}",
                    geocoder.provider_name()
                );
                None
            }
            Err(err) => {
                warn!(
                    "event=geocode module=geocode status=error provider={} error_code={} error={}",
                    geocoder.provider_name(),
                    err.code(),
                    err
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoordinateResolver;
    use crate::model::stop::Coordinates;
    use crate::provider::{Geocoder, ProviderError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedGeocoder {
        answer: Result<Option<Coordinates>, ProviderError>,
        calls: AtomicUsize,
    }

    impl Geocoder for FixedGeocoder {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn resolver(
        answer: Result<Option<Coordinates>, ProviderError>,
    ) -> (CoordinateResolver, Arc<FixedGeocoder>) {
        let geocoder = Arc::new(FixedGeocoder {
            answer,
            calls: AtomicUsize::new(0),
        });
        (CoordinateResolver::new(geocoder.clone()), geocoder)
    }

    #[test]
    fn disabled_resolver_never_resolves() {
        assert_eq!(CoordinateResolver::disabled().resolve("1 Main St"), None);
        assert!(!CoordinateResolver::disabled().is_configured());
    }

    #[test]
    fn success_returns_coordinates() {
        let (resolver, geocoder) = resolver(Ok(Some(Coordinates::new(1.0, 2.0))));
        assert_eq!(resolver.resolve("1 Main St"), Some(Coordinates::new(1.0, 2.0)));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.provider_name(), Some("fixed"));
    }

    #[test]
    fn provider_error_is_unresolvable() {
        let (resolver, _) = resolver(Err(ProviderError::Transport("timeout".to_string())));
        assert_eq!(resolver.resolve("1 Main St"), None);
    }

    #[test]
    fn out_of_range_result_is_unresolvable() {
        let (resolver, _) = resolver(Ok(Some(Coordinates::new(123.0, 0.0))));
        assert_eq!(resolver.resolve("1 Main St"), None);
    }

    #[test]
    fn blank_address_skips_provider() {
        let (resolver, geocoder) = resolver(Ok(Some(Coordinates::new(1.0, 2.0))));
        assert_eq!(resolver.resolve("  "), None);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }
}
