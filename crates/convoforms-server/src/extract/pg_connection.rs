use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use convoforms_postgres::{PgClient, PgConn};
use derive_more::{Deref, DerefMut};

use crate::handler::Error;

/// Connection checked out of the pool for the duration of a request.
///
/// The connection implements every repository trait, so handlers pass
/// `conn.connection()` straight to the access functions.
#[derive(Debug, Deref, DerefMut)]
pub struct PgPool(pub PgConn);

impl<S> FromRequestParts<S> for PgPool
where
    PgClient: FromRef<S>,
    S: Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pg_client = PgClient::from_ref(state);
        let conn = pg_client.get_connection().await.map_err(|e| {
            Error::from(e).with_message("Database connection unavailable")
        })?;

        Ok(PgPool(conn))
    }
}

impl aide::OperationInput for PgPool {}
