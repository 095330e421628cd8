use shared::{
    domain::{Payment, PaymentInput, PolicyId},
    protocol::{Page, PolicyHolderDetails, PolicyPaymentsPage, Saved, UserPaymentsPage},
};
use tracing::info;

use crate::{error::Result, transport::ApiClient};

use super::PageParams;

#[derive(Clone)]
pub struct PaymentService {
    payments: ApiClient,
}

impl PaymentService {
    pub fn new(payments: ApiClient) -> Self {
        Self { payments }
    }

    /// Every payment across the signed-in broker's policies.
    pub async fn list(&self, page: u32, limit: u32) -> Result<Page<Payment>> {
        let user_id = self.payments.session().require_user_id()?;
        let raw: UserPaymentsPage = self
            .payments
            .get(
                &format!("usuarios/{user_id}/pagos"),
                &PageParams::list(page, limit),
            )
            .await?;
        Ok(raw.into())
    }

    pub async fn for_policy(
        &self,
        policy_id: PolicyId,
        page: u32,
        limit: u32,
    ) -> Result<Page<Payment>> {
        let raw: PolicyPaymentsPage = self
            .payments
            .get(
                &format!("polizas/{policy_id}/pagos"),
                &PageParams::list(page, limit),
            )
            .await?;
        Ok(raw.into())
    }

    pub async fn create(
        &self,
        policy_id: PolicyId,
        input: &PaymentInput,
    ) -> Result<Option<Payment>> {
        let saved: Saved<Payment> = self
            .payments
            .post(&format!("polizas/{policy_id}/pagos"), input)
            .await?;
        info!(policy_id = policy_id.0, amount = %input.amount, "payment recorded");
        Ok(saved.into_record())
    }

    /// Header data for a policy's payments view.
    pub async fn policy_holder(&self, policy_id: PolicyId) -> Result<PolicyHolderDetails> {
        self.payments
            .get(
                &format!("poliza/{policy_id}"),
                &PageParams::list(1, 1),
            )
            .await
    }
}
