use reqwest::multipart::Form;
use shared::{
    domain::{ClientId, Policy, PolicyId, PolicyInput},
    protocol::{ClientPoliciesPage, Envelope, LaravelPage, Page, PolicySearchPage, Saved},
};
use tracing::info;

use crate::{
    attachment::Document,
    error::Result,
    export::XLSX_MIME,
    forms::PolicySubmission,
    transport::{ApiClient, NO_QUERY},
};

use super::PageParams;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone)]
pub struct PolicyService {
    policies: ApiClient,
    search: ApiClient,
}

impl PolicyService {
    pub fn new(policies: ApiClient, search: ApiClient) -> Self {
        Self { policies, search }
    }

    pub async fn list(&self, page: u32, limit: u32) -> Result<Page<Policy>> {
        let raw: LaravelPage<Policy> = self
            .policies
            .get("polizas", &PageParams::list(page, limit))
            .await?;
        Ok(raw.into())
    }

    pub async fn search(&self, term: &str, page: u32, limit: u32) -> Result<Page<Policy>> {
        let raw: PolicySearchPage = self
            .search
            .get("polizas", &PageParams::search(term, page, limit))
            .await?;
        Ok(raw.into())
    }

    pub async fn get(&self, policy_id: PolicyId) -> Result<Policy> {
        let policy: Envelope<Policy> = self
            .policies
            .get(&format!("polizas/{policy_id}"), NO_QUERY)
            .await?;
        Ok(policy.into_inner())
    }

    pub async fn for_client(
        &self,
        client_id: ClientId,
        page: u32,
        limit: u32,
    ) -> Result<Page<Policy>> {
        let raw: ClientPoliciesPage = self
            .policies
            .get(
                &format!("clientes/{client_id}/polizas"),
                &PageParams::list(page, limit),
            )
            .await?;
        Ok(raw.into())
    }

    /// Multipart create; the PDF travels as `archivo_pdf`.
    pub async fn create_for_client(
        &self,
        client_id: ClientId,
        submission: &PolicySubmission,
    ) -> Result<Option<Policy>> {
        if let Some(document) = &submission.attachment {
            document.validate_pdf()?;
        }

        let mut form = policy_fields(&submission.terms);
        if let Some(document) = &submission.attachment {
            form = form.part("archivo_pdf", document.to_part()?);
        }

        let saved: Saved<Policy> = self
            .policies
            .post_multipart(&format!("clientes/{client_id}/polizas"), form)
            .await?;
        info!(
            client_id = client_id.0,
            with_pdf = submission.attachment.is_some(),
            "policy created"
        );
        Ok(saved.into_record())
    }

    pub async fn update(
        &self,
        client_id: ClientId,
        policy_id: PolicyId,
        terms: &PolicyInput,
    ) -> Result<Option<Policy>> {
        let saved: Saved<Policy> = self
            .policies
            .put(&format!("clientes/{client_id}/polizas/{policy_id}"), terms)
            .await?;
        info!(policy_id = policy_id.0, "policy updated");
        Ok(saved.into_record())
    }

    pub async fn delete(&self, client_id: ClientId, policy_id: PolicyId) -> Result<()> {
        self.policies
            .delete(&format!("clientes/{client_id}/polizas/{policy_id}"))
            .await?;
        info!(policy_id = policy_id.0, "policy deleted");
        Ok(())
    }

    pub async fn export_excel(&self) -> Result<Vec<u8>> {
        let user_id = self.policies.session().require_user_id()?;
        self.policies
            .get_bytes(&format!("export-policies/{user_id}"), XLSX_MIME)
            .await
    }

    /// Attaches a PDF to an existing policy.
    pub async fn upload_document(&self, policy_id: PolicyId, document: &Document) -> Result<()> {
        document.validate_pdf()?;
        let form = Form::new().part("archivo_pdf", document.to_part()?);
        let _: serde_json::Value = self
            .policies
            .post_multipart(&format!("polizas/{policy_id}/documento"), form)
            .await?;
        info!(policy_id = policy_id.0, file = %document.filename, "policy document uploaded");
        Ok(())
    }
}

fn policy_fields(terms: &PolicyInput) -> Form {
    Form::new()
        .text("tipo_seguro", terms.insurance_type.clone())
        .text("prima_neta", terms.net_premium.to_string())
        .text("asegurado", terms.insured.clone())
        .text("vigencia_de", terms.valid_from.format(DATE_FORMAT).to_string())
        .text("vigencia_hasta", terms.valid_to.format(DATE_FORMAT).to_string())
        .text("periodicidad_pago", terms.payment_frequency.as_wire())
}
