use shared::{
    domain::{Client, ClientId, ClientInput, ClientNote, Payment},
    protocol::{
        ClientSearchPage, Envelope, HomeSearchResponse, HomeSearchResults, LaravelPage,
        NoteRequest, NotesResponse, Page, PaymentsResponse, Saved,
    },
};
use tracing::info;

use crate::{
    error::{ClientError, Result},
    export::XLSX_MIME,
    forms::FormErrors,
    transport::{ApiClient, NO_QUERY},
};

use super::PageParams;

/// Clients of the signed-in broker, their notes and the combined home search.
#[derive(Clone)]
pub struct ClientService {
    clients: ApiClient,
    search: ApiClient,
    notes: ApiClient,
}

impl ClientService {
    pub fn new(clients: ApiClient, search: ApiClient, notes: ApiClient) -> Self {
        Self {
            clients,
            search,
            notes,
        }
    }

    pub async fn list(&self, page: u32, limit: u32) -> Result<Page<Client>> {
        let user_id = self.clients.session().require_user_id()?;
        let raw: LaravelPage<Client> = self
            .clients
            .get(&format!("{user_id}/clients"), &PageParams::list(page, limit))
            .await?;
        Ok(raw.into())
    }

    pub async fn search(&self, term: &str, page: u32, limit: u32) -> Result<Page<Client>> {
        let user_id = self.search.session().require_user_id()?;
        let raw: ClientSearchPage = self
            .search
            .get(
                &format!("users/{user_id}/search/clientes"),
                &PageParams::search(term, page, limit),
            )
            .await?;
        Ok(raw.into())
    }

    /// Clients and policies matching `term`, paginated independently.
    pub async fn home_search(
        &self,
        term: &str,
        page: u32,
        limit: u32,
    ) -> Result<HomeSearchResults> {
        let user_id = self.search.session().require_user_id()?;
        let raw: HomeSearchResponse = self
            .search
            .get(
                &format!("users/{user_id}/search/buscar"),
                &PageParams::search(term, page, limit),
            )
            .await?;
        Ok(raw.into())
    }

    pub async fn get(&self, client_id: ClientId) -> Result<Client> {
        let user_id = self.clients.session().require_user_id()?;
        let client: Envelope<Client> = self
            .clients
            .get(&format!("{user_id}/clients/{client_id}"), NO_QUERY)
            .await?;
        Ok(client.into_inner())
    }

    pub async fn add(&self, input: &ClientInput) -> Result<Option<Client>> {
        let user_id = self.clients.session().require_user_id()?;
        let saved: Saved<Client> = self
            .clients
            .post(&format!("{user_id}/clients/add"), input)
            .await?;
        info!(user_id = user_id.0, "client added");
        Ok(saved.into_record())
    }

    /// Full-record update.
    pub async fn update(&self, client_id: ClientId, input: &ClientInput) -> Result<Option<Client>> {
        let user_id = self.clients.session().require_user_id()?;
        let saved: Saved<Client> = self
            .clients
            .put(&format!("{user_id}/clients/{client_id}"), input)
            .await?;
        info!(user_id = user_id.0, client_id = client_id.0, "client updated");
        Ok(saved.into_record())
    }

    /// The broker's whole client list as an XLSX workbook.
    pub async fn export_excel(&self) -> Result<Vec<u8>> {
        let user_id = self.clients.session().require_user_id()?;
        self.clients
            .get_bytes(&format!("download-excel/{user_id}"), XLSX_MIME)
            .await
    }

    pub async fn payments(&self, client_id: ClientId) -> Result<Vec<Payment>> {
        let payments: PaymentsResponse = self
            .clients
            .get(&format!("{client_id}/payments"), NO_QUERY)
            .await?;
        Ok(payments.into_payments())
    }

    pub async fn notes(&self, client_id: ClientId) -> Result<Vec<ClientNote>> {
        let notes: NotesResponse = self
            .notes
            .get(&format!("{client_id}/notas"), NO_QUERY)
            .await?;
        Ok(notes.into_notes())
    }

    pub async fn add_note(&self, client_id: ClientId, content: &str) -> Result<Option<ClientNote>> {
        let content = content.trim();
        if content.is_empty() {
            let mut errors = FormErrors::default();
            errors.add("content", "note cannot be empty");
            return Err(ClientError::Validation(errors));
        }
        let saved: Saved<ClientNote> = self
            .notes
            .post(
                &format!("{client_id}/notas"),
                &NoteRequest {
                    content: content.to_string(),
                },
            )
            .await?;
        Ok(saved.into_record())
    }
}
