// src/views/list.rs

use std::{collections::BTreeMap, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    common::{
        error::{field_messages, AppError, FieldErrors},
        notify::Notifier,
    },
    db::{
        client::{fetch_all, insert_one},
        DataClient, Query, Row,
    },
    models::crm::{InsertForm, SelectOption},
    routes::Route,
    views::{page::Table, until_cancelled},
};

/// A configuração de uma listagem: tabela, colunas, joins, busca e formulário.
pub trait ListEntity: Send + Sync + 'static {
    const TABLE: &'static str;
    /// "Customer", usado nas mensagens de sucesso
    const LABEL: &'static str;
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    const COLUMNS: &'static [&'static str];
    const SEARCH_COLUMN: Option<&'static str> = None;
    /// Tabelas que alimentam os <select> do formulário (`id, name`)
    const OPTION_SOURCES: &'static [&'static str] = &[];

    type Row: DeserializeOwned + Clone + Send + Sync;
    type Form: InsertForm;

    /// Query base, com joins e ordenação; a busca é aplicada por cima.
    fn query() -> Query {
        Query::from(Self::TABLE)
    }

    fn row_id(row: &Self::Row) -> Uuid;

    fn link(_row: &Self::Row) -> Option<Route> {
        None
    }

    fn cells(row: &Self::Row) -> Vec<String>;
}

/// O estado do modal de criação.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState<F> {
    pub open: bool,
    pub values: F,
    pub errors: FieldErrors,
}

impl<F: Default> Default for FormState<F> {
    fn default() -> Self {
        Self { open: false, values: F::default(), errors: FieldErrors::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// Validação local falhou; nada foi enviado
    Invalid,
    /// O store recusou; o formulário continua aberto com os valores
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListView<F> {
    pub title: &'static str,
    pub search: String,
    pub table: Table,
    pub form: FormState<F>,
    pub options: BTreeMap<&'static str, Vec<SelectOption>>,
}

/// fetch -> render -> mutate -> re-fetch, igual para toda entidade.
pub struct DataList<E: ListEntity> {
    client: Arc<dyn DataClient>,
    notifier: Notifier,
    cancel: CancellationToken,
    items: Vec<E::Row>,
    search: String,
    options: BTreeMap<&'static str, Vec<SelectOption>>,
    form: FormState<E::Form>,
}

impl<E: ListEntity> DataList<E> {
    pub fn new(client: Arc<dyn DataClient>, notifier: Notifier, cancel: CancellationToken) -> Self {
        Self {
            client,
            notifier,
            cancel,
            items: Vec::new(),
            search: String::new(),
            options: BTreeMap::new(),
            form: FormState::default(),
        }
    }

    pub fn items(&self) -> &[E::Row] {
        &self.items
    }

    pub fn form(&self) -> &FormState<E::Form> {
        &self.form
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Desmontagem: o que estiver em voo não escreve mais no estado.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// Abertura da página: a coleção e as opções dos <select>.
    pub async fn mount(&mut self, filter: Option<String>) {
        self.fetch_all(filter).await;
        self.load_options().await;
    }

    /// Busca a coleção. `Some` substitui o termo de busca (vazio = sem filtro);
    /// `None` mantém o corrente, para recarregar depois de uma mutação.
    /// Em erro, notifica uma vez e mantém a coleção anterior.
    pub async fn fetch_all(&mut self, filter: Option<String>) -> bool {
        if let Some(term) = filter {
            self.search = term;
        }

        let mut query = E::query();
        let term = self.search.trim();
        if let Some(column) = E::SEARCH_COLUMN {
            if !term.is_empty() {
                query = query.contains(column, term);
            }
        }

        let client = Arc::clone(&self.client);
        let Some(result) = until_cancelled(&self.cancel, fetch_all::<E::Row>(client.as_ref(), &query)).await else {
            return false;
        };

        match result {
            Ok(rows) => {
                self.items = rows;
                true
            }
            Err(e) => {
                tracing::error!("Erro ao buscar {}: {}", E::PLURAL, e);
                self.notifier.error(format!("Failed to fetch {}", E::PLURAL));
                false
            }
        }
    }

    // Falha aqui só é logada: o formulário abre com a lista vazia
    async fn load_options(&mut self) {
        for &source in E::OPTION_SOURCES {
            let query = Query::from(source).columns(&["id", "name"]);
            let client = Arc::clone(&self.client);
            match until_cancelled(&self.cancel, fetch_all::<SelectOption>(client.as_ref(), &query)).await {
                Some(Ok(options)) => {
                    self.options.insert(source, options);
                }
                Some(Err(e)) => tracing::error!("Erro ao buscar opções de {}: {}", source, e),
                None => return,
            }
        }
    }

    pub fn open_form(&mut self) {
        self.form = FormState { open: true, ..FormState::default() };
    }

    pub fn close_form(&mut self) {
        self.form.open = false;
    }

    /// Valida, insere e recarrega.
    pub async fn create(&mut self, values: E::Form) -> CreateOutcome {
        self.form.open = true;
        self.form.values = values.clone();
        self.form.errors.clear();

        let insert = match values.to_insert() {
            Ok(insert) => insert,
            Err(AppError::ValidationError(errors)) => {
                self.form.errors = field_messages(&errors);
                return CreateOutcome::Invalid;
            }
            Err(e) => {
                tracing::error!("Erro ao preparar {}: {}", E::SINGULAR, e);
                self.notifier.error(format!("Failed to add {}", E::SINGULAR));
                return CreateOutcome::Failed;
            }
        };

        let client = Arc::clone(&self.client);
        match until_cancelled(&self.cancel, insert_one(client.as_ref(), E::TABLE, &insert)).await {
            None => CreateOutcome::Cancelled,
            Some(Err(e)) => {
                tracing::error!("Erro ao adicionar {}: {}", E::SINGULAR, e);
                self.notifier.error(format!("Failed to add {}", E::SINGULAR));
                CreateOutcome::Failed
            }
            Some(Ok(_)) => {
                self.notifier.success(format!("{} added successfully", E::LABEL));
                self.form = FormState::default();
                self.fetch_all(None).await;
                CreateOutcome::Created
            }
        }
    }

    /// Atualiza uma linha por id e recarrega a coleção.
    pub async fn update_row(&mut self, id: Uuid, patch: Row) -> bool {
        let client = Arc::clone(&self.client);
        let Some(result) = until_cancelled(&self.cancel, client.update(E::TABLE, id, patch)).await else {
            return false;
        };

        match result {
            Ok(rows) if !rows.is_empty() => {
                self.fetch_all(None).await;
                true
            }
            Ok(_) => {
                tracing::warn!("{} {} não encontrado para atualização", E::SINGULAR, id);
                self.notifier.error(format!("Failed to update {}", E::SINGULAR));
                false
            }
            Err(e) => {
                tracing::error!("Erro ao atualizar {}: {}", E::SINGULAR, e);
                self.notifier.error(format!("Failed to update {}", E::SINGULAR));
                false
            }
        }
    }

    pub fn render(&self) -> ListView<E::Form> {
        let mut table = Table::new(E::COLUMNS);
        for row in &self.items {
            table.push(E::row_id(row), E::link(row), E::cells(row));
        }

        ListView {
            title: E::PLURAL,
            search: self.search.clone(),
            table,
            form: self.form.clone(),
            options: self.options.clone(),
        }
    }
}
