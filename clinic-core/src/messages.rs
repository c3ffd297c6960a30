//! User-facing message tables.
//!
//! Tables are `'static` and never change after start-up; the locale is picked
//! once from configuration.

use std::str::FromStr;

/// Display language of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

impl Locale {
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Locale::PtBr),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

/// Fixed messages for every response the normalizer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCatalog {
    pub locale: Locale,
    pub generic: &'static str,
    pub validation: &'static str,
    pub duplicate: &'static str,
    pub session_expired: &'static str,
    pub access_denied: &'static str,
    pub not_found: &'static str,
    pub unavailable: &'static str,
    pub fatal: &'static str,
}

const PT_BR: MessageCatalog = MessageCatalog {
    locale: Locale::PtBr,
    generic: "Ocorreu um erro inesperado. Tente novamente em instantes.",
    validation: "Dados inválidos. Verifique os campos destacados e tente novamente.",
    duplicate: "Registro já existe com os dados informados. Altere os valores e tente novamente.",
    session_expired: "Sessão expirada ou inválida. Faça login novamente.",
    access_denied: "Acesso negado. Você não tem permissão para realizar esta ação.",
    not_found: "Recurso não encontrado.",
    unavailable: "Serviço temporariamente indisponível. Tente novamente em instantes.",
    fatal: "Erro interno no servidor.",
};

const EN: MessageCatalog = MessageCatalog {
    locale: Locale::En,
    generic: "An unexpected error occurred. Please try again shortly.",
    validation: "Invalid data. Check the highlighted fields and try again.",
    duplicate: "A record with the given data already exists. Change the values and try again.",
    session_expired: "Session expired or invalid. Please log in again.",
    access_denied: "Access denied. You are not allowed to perform this action.",
    not_found: "Resource not found.",
    unavailable: "Service temporarily unavailable. Please try again shortly.",
    fatal: "Internal server error.",
};

impl MessageCatalog {
    pub const fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::PtBr => PT_BR,
            Locale::En => EN,
        }
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}
