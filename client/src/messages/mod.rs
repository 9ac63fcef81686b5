pub mod internal_messages;
pub mod ui_messages;

use actix::MailboxError;
use common::errors::PairingError;

/// Collapses the answer of a fallible request. A closed mailbox means the
/// receiver was unmounted.
pub fn flatten<T>(res: Result<Result<T, PairingError>, MailboxError>) -> Result<T, PairingError> {
    match res {
        Ok(inner) => inner,
        Err(_) => Err(PairingError::Detached),
    }
}
