//! Common test utilities and fixtures
#![allow(dead_code)]

use legalform::config::AppConfig;
use legalform::gateway::{
    EmailSender, MemoryStore, MockPaymentGateway, PaymentGateway, RecordingEmailSender,
};
use legalform::intake::{AssociateDraft, CompanyRequestDraft};
use legalform::server::{AppState, Gateways};
use std::sync::Arc;

/// Builder for wizard drafts that pass validation
pub struct DraftBuilder {
    draft: CompanyRequestDraft,
}

impl DraftBuilder {
    /// SARL in Abidjan with no associates yet
    pub fn new() -> Self {
        Self {
            draft: CompanyRequestDraft {
                structure_type: "sarl".to_string(),
                region: "Abidjan".to_string(),
                city: "Abidjan".to_string(),
                address: "Cocody Riviera 3".to_string(),
                company_name: "Kone Distribution".to_string(),
                activity: "Commerce général".to_string(),
                capital: "500000".to_string(),
                associates_count: String::new(),
                contact_name: "Awa Kone".to_string(),
                phone: "+2250101010101".to_string(),
                email: "awa@example.com".to_string(),
                additional_services: Vec::new(),
                associates: Vec::new(),
            },
        }
    }

    pub fn capital(mut self, capital: &str) -> Self {
        self.draft.capital = capital.to_string();
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.draft.region = region.to_string();
        self
    }

    pub fn service(mut self, id: &str) -> Self {
        self.draft.additional_services.push(id.to_string());
        self
    }

    /// Add an associate; the first one added is the manager
    pub fn associate(mut self, id: &str, name: &str, cash: f64, in_kind: f64) -> Self {
        let is_manager = self.draft.associates.is_empty();
        self.draft.associates.push(AssociateDraft {
            id: id.to_string(),
            full_name: name.to_string(),
            is_manager,
            cash_contribution: cash,
            nature_contribution_value: in_kind,
            ..AssociateDraft::default()
        });
        self
    }

    pub fn build(self) -> CompanyRequestDraft {
        self.draft
    }
}

/// Two associates, 300000 and 200000 FCFA, against a capital of 500000
pub fn two_associate_draft() -> CompanyRequestDraft {
    DraftBuilder::new()
        .associate("a1", "Awa Kone", 300_000.0, 0.0)
        .associate("a2", "Yao Kouassi", 200_000.0, 0.0)
        .build()
}

/// In-memory collaborators with handles kept for assertions
pub struct TestHarness {
    pub store: MemoryStore,
    pub payments: MockPaymentGateway,
    pub email: RecordingEmailSender,
    pub config: AppConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            payments: MockPaymentGateway::new(),
            email: RecordingEmailSender::new(),
            config: AppConfig::default(),
        }
    }

    /// Gateways with payment and email enabled
    pub fn gateways(&self) -> Gateways {
        let mut gateways = Gateways::in_memory(self.store.clone());
        gateways.payments = Some(Arc::new(self.payments.clone()) as Arc<dyn PaymentGateway>);
        gateways.email = Some(Arc::new(self.email.clone()) as Arc<dyn EmailSender>);
        gateways
    }

    /// Gateways with neither a payment provider nor an email sender
    pub fn offline_gateways(&self) -> Gateways {
        Gateways::in_memory(self.store.clone())
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.gateways(), &self.config).expect("state builds")
    }

    pub fn offline_state(&self) -> AppState {
        AppState::new(self.offline_gateways(), &self.config).expect("state builds")
    }
}
