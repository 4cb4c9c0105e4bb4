use crate::error::EngineError;
use contable_executor::is_identifier;

/// Allow-list of views that may be interpolated into a SELECT.
///
/// Request input is only ever compared against this list; the text that
/// reaches the database always comes from the list itself.
#[derive(Debug, Clone)]
pub struct ViewCatalog {
    schema: String,
    views: Vec<String>,
}

impl ViewCatalog {
    pub fn new<I, S>(schema: &str, views: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !is_identifier(schema) {
            return Err(EngineError::InvalidIdentifier(schema.to_string()));
        }
        let mut list: Vec<String> = Vec::new();
        for v in views {
            let v = v.into().trim().to_string();
            if !is_identifier(&v) {
                return Err(EngineError::InvalidIdentifier(v));
            }
            if !list.contains(&v) {
                list.push(v);
            }
        }
        Ok(Self {
            schema: schema.to_string(),
            views: list,
        })
    }

    pub fn views(&self) -> &[String] {
        &self.views
    }

    /// The allow-listed spelling of `name`, if it is known.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.views
            .iter()
            .find(|v| v.as_str() == name)
            .map(String::as_str)
    }

    /// `SELECT * FROM schema.view WHERE Empresa = ?`, or `None` for unknown views.
    pub fn company_query(&self, name: &str) -> Option<String> {
        self.lookup(name)
            .map(|view| format!("SELECT * FROM {}.{} WHERE Empresa = ?", self.schema, view))
    }

    /// Companies directory query against `table` in this schema.
    pub fn directory_query(&self, table: &str) -> Result<String, EngineError> {
        if !is_identifier(table) {
            return Err(EngineError::InvalidIdentifier(table.to_string()));
        }
        Ok(format!(
            "SELECT REG_Empresa, Nombre_empresa FROM {}.{}",
            self.schema, table
        ))
    }
}
