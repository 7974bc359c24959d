//! Price estimate shown at the end of the wizard

use super::types::AdditionalService;
use crate::config::PricingConfig;

/// Base price for `region` plus the surcharge of each selected service.
///
/// Services without a configured surcharge are included in the base price.
pub fn estimate_price(region: &str, services: &[AdditionalService], pricing: &PricingConfig) -> f64 {
    let base = if region.trim() == pricing.premium_region {
        pricing.premium_price
    } else {
        pricing.standard_price
    };

    let extras: f64 = services
        .iter()
        .filter_map(|service| pricing.service_surcharges.get(service.id()))
        .sum();

    base + extras
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_base_price() {
        let pricing = PricingConfig::default();
        assert_eq!(estimate_price("Abidjan", &[], &pricing), 150_000.0);
        assert_eq!(estimate_price("Bouaké", &[], &pricing), 200_000.0);
    }

    #[test]
    fn test_services_included_by_default() {
        let pricing = PricingConfig::default();
        let services = [AdditionalService::Dfe, AdditionalService::Domiciliation];
        assert_eq!(estimate_price("Abidjan", &services, &pricing), 150_000.0);
    }

    #[test]
    fn test_configured_surcharges() {
        let mut pricing = PricingConfig::default();
        pricing
            .service_surcharges
            .insert("domiciliation".to_string(), 25_000.0);
        pricing.service_surcharges.insert("cnps".to_string(), 10_000.0);

        let services = [AdditionalService::Domiciliation, AdditionalService::Ncc];
        assert_eq!(estimate_price("Man", &services, &pricing), 225_000.0);
    }
}
