//! Error types and handling for `TempGraph`

use thiserror::Error;

/// Shown when the typed city name is too short.
pub const INVALID_CITY_MESSAGE: &str = "Introduce un nombre de ciudad válido (mínimo 3 letras).";

/// Shown when geocoding yields no match.
pub const CITY_NOT_FOUND_MESSAGE: &str = "No se encontró la ciudad. Revisa la ortografía.";

/// Main error type for the `TempGraph` application
#[derive(Error, Debug)]
pub enum TempGraphError {
    /// The typed city name failed validation
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Geocoding returned zero results
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// A request to an upstream service could not complete
    #[error("Network error: {message}")]
    Network { message: String },

    /// An upstream response lacked the expected fields
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Drawing the chart failed
    #[error("Render error: {message}")]
    Render { message: String },

    /// A page template failed to compile or render
    #[error("Template error: {message}")]
    Template { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TempGraphError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error for the given query
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(message: S) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TempGraphError::Validation { .. } => INVALID_CITY_MESSAGE.to_string(),
            TempGraphError::NotFound { .. } => CITY_NOT_FOUND_MESSAGE.to_string(),
            TempGraphError::Network { message } => message.clone(),
            TempGraphError::MalformedResponse { .. } => {
                "El servicio de previsión devolvió datos incompletos.".to_string()
            }
            TempGraphError::Render { .. } => "No se pudo dibujar la gráfica.".to_string(),
            TempGraphError::Template { .. } => "No se pudo generar la página.".to_string(),
            TempGraphError::Config { .. } => {
                "Error de configuración. Revisa el fichero de configuración.".to_string()
            }
            TempGraphError::Io { .. } => "Error de lectura o escritura de ficheros.".to_string(),
        }
    }
}
