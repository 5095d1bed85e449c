use crate::core::domain::value_object::ProxmoxTicket;

/// Session obtained from a password login.
#[derive(Debug, Clone)]
pub struct ProxmoxAuth {
    ticket: ProxmoxTicket,
    csrf_token: String,
}

impl ProxmoxAuth {
    pub fn new(ticket: ProxmoxTicket, csrf_token: impl Into<String>) -> Self {
        Self {
            ticket,
            csrf_token: csrf_token.into(),
        }
    }

    pub fn ticket(&self) -> &ProxmoxTicket {
        &self.ticket
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}
