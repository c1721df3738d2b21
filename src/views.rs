// src/views.rs

use std::future::Future;

use tokio_util::sync::CancellationToken;

pub mod dashboard;
pub mod detail;
pub mod entities;
pub mod list;
pub mod page;

pub use entities::{ActivityList, CustomerList, DealList};
pub use list::{CreateOutcome, DataList, ListEntity, ListView};

/// Corre `fut` até terminar ou até a view ser desmontada.
/// `None` significa cancelado: quem chamou não deve tocar no estado.
pub(crate) async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}
