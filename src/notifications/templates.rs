//! Email and SMS copy
//!
//! Emails extend a shared `base.html` layout. Template names ending in
//! `.html` are auto-escaped by tera, so customer-provided names are safe to
//! interpolate.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::Result;
use crate::gateway::RequestStatus;

const BASE_HTML: &str = r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background: linear-gradient(135deg, #17a2b8 0%, #118091 100%); padding: 30px; text-align: center;">
    <h1 style="color: white; margin: 0;">Legal Form</h1>
    <p style="color: white; margin: 10px 0 0 0;">Formaliser votre business est notre raison d'être</p>
  </div>
  <div style="padding: 30px; background: #f8f9fa;">
    <h2 style="color: #17a2b8;">Bonjour {{ client_name }},</h2>
    <p style="font-size: 16px; line-height: 1.6;">{{ message }}</p>
    <div style="background: white; padding: 20px; border-radius: 8px; margin: 20px 0;">
      <p style="margin: 5px 0;"><strong>Numéro de suivi:</strong> {{ tracking_number }}</p>
      {% block details %}{% endblock details %}
    </div>
    <p style="margin-top: 30px;">
      <a href="{{ dashboard_url | safe }}" style="background: #17a2b8; color: white; padding: 12px 30px; text-decoration: none; border-radius: 5px; display: inline-block;">Accéder à mon espace client</a>
    </p>
    <p style="color: #6c757d; font-size: 14px; margin-top: 30px;">
      Pour toute question, contactez-nous:<br>
      {{ support_email }}<br>
      {{ support_phone }}
    </p>
  </div>
</div>
"#;

const STATUS_CHANGE_HTML: &str = r#"{% extends "base.html" %}
{% block details %}<p style="margin: 5px 0;"><strong>Nouveau statut:</strong> {{ headline }}</p>{% endblock details %}
"#;

const NEW_REQUEST_HTML: &str = r#"{% extends "base.html" %}
{% block details %}<p style="margin: 5px 0;"><strong>Montant estimé:</strong> {{ estimated_price }}</p>
{% if payment_url %}<p style="margin: 5px 0;"><a href="{{ payment_url | safe }}">Procéder au paiement</a></p>{% endif %}{% endblock details %}
"#;

const PAYMENT_RECEIVED_HTML: &str = r#"{% extends "base.html" %}
{% block details %}<p style="margin: 5px 0;"><strong>Paiement:</strong> confirmé</p>{% endblock details %}
"#;

const SMS_TXT: &str = "LegalForm: {{ headline }}. Dossier {{ tracking_number }}. {{ message }} Consultez votre espace: legalform.ci";

/// Subject line and body sentence for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCopy {
    pub headline: &'static str,
    pub message: &'static str,
}

/// Copy for a status change; statuses without dedicated copy get a generic update
pub fn status_copy(status: RequestStatus) -> MessageCopy {
    match status {
        RequestStatus::InProgress => MessageCopy {
            headline: "Dossier en cours de traitement",
            message: "Votre dossier est maintenant en cours de traitement. Notre équipe travaille activement dessus.",
        },
        RequestStatus::DocumentsRequired => MessageCopy {
            headline: "Documents supplémentaires requis",
            message: "Nous avons besoin de documents supplémentaires pour traiter votre dossier. Veuillez vérifier votre espace client.",
        },
        RequestStatus::AwaitingPayment => MessageCopy {
            headline: "En attente de paiement",
            message: "Votre dossier est prêt. Veuillez effectuer le paiement pour finaliser la création de votre entreprise.",
        },
        RequestStatus::Completed => MessageCopy {
            headline: "🎉 Votre entreprise est créée !",
            message: "Félicitations ! Votre entreprise a été créée avec succès. Tous vos documents sont disponibles dans votre espace client.",
        },
        _ => MessageCopy {
            headline: "Mise à jour de votre dossier",
            message: "Le statut de votre dossier a été mis à jour.",
        },
    }
}

pub const NEW_REQUEST_COPY: MessageCopy = MessageCopy {
    headline: "Demande reçue",
    message: "Nous avons bien reçu votre demande de création d'entreprise. Un conseiller vous contactera sous 24h.",
};

pub const PAYMENT_RECEIVED_COPY: MessageCopy = MessageCopy {
    headline: "Paiement confirmé",
    message: "Nous avons bien reçu votre paiement pour votre demande de création d'entreprise. Nous allons maintenant traiter votre dossier. Vous recevrez un email dès que votre entreprise sera créée.",
};

/// Values shared by every template
#[derive(Debug, Clone, Serialize)]
pub struct TemplateValues {
    pub client_name: String,
    pub tracking_number: String,
    pub headline: String,
    pub message: String,
    pub dashboard_url: String,
    pub support_email: String,
    pub support_phone: String,
    pub estimated_price: Option<String>,
    pub payment_url: Option<String>,
}

pub struct NotificationTemplates {
    tera: Tera,
}

impl NotificationTemplates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", BASE_HTML),
            ("status_change.html", STATUS_CHANGE_HTML),
            ("new_request.html", NEW_REQUEST_HTML),
            ("payment_received.html", PAYMENT_RECEIVED_HTML),
            ("sms.txt", SMS_TXT),
        ])?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, values: &TemplateValues) -> Result<String> {
        let context = Context::from_serialize(values)?;
        Ok(self.tera.render(name, &context)?)
    }
}

/// Format an amount as `150 000 FCFA`
pub fn format_fcfa(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{grouped} FCFA")
}
