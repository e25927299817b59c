//! Coordinator configuration.
//!
//! Every recognized option is an explicit struct field with a default;
//! there are no open-ended option bags.

/// Brand settings for the hosted OAuth pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandConfig {
    /// Brand identifier passed to the authorization URL.
    pub id: String,

    /// Display name, used by embedding applications.
    pub name: String,
}

impl BrandConfig {
    /// Create brand settings.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Coordinator configuration.
///
/// `redirect_uri` and `proxy_uri` left unset default to `./redirect.html`
/// and `./proxy.html` resolved against the channel host's base URI when one
/// exists, else stay absent (which disables the proxy flow).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// OAuth redirect URI.
    pub redirect_uri: Option<String>,

    /// Proxy page URI for the background callback-capture channel.
    pub proxy_uri: Option<String>,

    /// Brand settings.
    pub brand: BrandConfig,
}

impl AuthConfig {
    /// Create a configuration with default URIs.
    #[must_use]
    pub const fn new(brand: BrandConfig) -> Self {
        Self {
            redirect_uri: None,
            proxy_uri: None,
            brand,
        }
    }

    /// Set an explicit redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Set an explicit proxy URI.
    #[must_use]
    pub fn with_proxy_uri(mut self, uri: impl Into<String>) -> Self {
        self.proxy_uri = Some(uri.into());
        self
    }
}

/// Credentials accepted by [`login`].
///
/// [`login`]: crate::coordinator::AuthCoordinator::login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCredentials {
    /// Resource-owner password grant.
    Password {
        /// Account username.
        username: String,
        /// Account password.
        password: String,
        /// Extension number, for accounts with sub-extensions.
        extension: Option<String>,
        /// Whether the platform should persist the session.
        remember: bool,
    },

    /// Authorization-code exchange, used by the redirect/proxy flow.
    AuthorizationCode {
        /// The `code` query parameter from the OAuth callback.
        code: String,
        /// The redirect URI the code was issued against.
        redirect_uri: String,
    },
}

/// Options for building the interactive OAuth authorization URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginUrlOptions {
    /// Redirect URI the authorization should return to.
    pub redirect_uri: String,

    /// Opaque state round-tripped through the provider.
    pub state: Option<String>,

    /// Brand identifier.
    pub brand_id: Option<String>,

    /// Display hint for the hosted login page.
    pub display: Option<String>,

    /// Prompt hint for the hosted login page.
    pub prompt: Option<String>,

    /// Force an interactive login even when a session exists. Appended by
    /// the coordinator as a literal `&force` suffix; platform clients
    /// ignore this field.
    pub force: bool,
}

impl LoginUrlOptions {
    /// Create options for the given redirect URI.
    #[must_use]
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            ..Self::default()
        }
    }

    /// Set the round-tripped state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Set the brand identifier.
    #[must_use]
    pub fn with_brand_id(mut self, brand_id: impl Into<String>) -> Self {
        self.brand_id = Some(brand_id.into());
        self
    }

    /// Set the display hint.
    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Set the prompt hint.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Force an interactive login.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}
