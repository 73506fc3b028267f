//! Daraja (Safaricom M-Pesa) gateway client: OAuth token cache (C4) and
//! STK Push initiate/query (C5).

mod auth;
mod error;
mod stk;

pub use auth::{DarajaAuth, DarajaCredentials};
pub use error::{DarajaError, DarajaResult};
pub use stk::{
    describe_result_code, StkClient, StkInitiateResult, StkStatusResponse,
    DEFAULT_REQUEST_TIMEOUT,
};
