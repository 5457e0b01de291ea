use rolegate_policy::{Principal, PrincipalId, Role};

/// Authenticated principal for a request, inserted by the route guard.
///
/// Handlers behind the guard can rely on this being present; public
/// pages see it only when a valid session accompanied the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPrincipal {
    principal: Principal,
}

impl CurrentPrincipal {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn id(&self) -> PrincipalId {
        self.principal.id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn email(&self) -> &str {
        &self.principal.email
    }
}
