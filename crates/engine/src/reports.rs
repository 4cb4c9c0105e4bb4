//! Report endpoints backed by stored procedures.
//!
//! Each report differs only in the procedure it calls and the arguments it
//! passes, so they are all described by one table and served by one handler.

use serde_json::Value;
use std::collections::HashMap;

/// Company id every report procedure is called with.
pub const COMPANY_ID: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgTemplate {
    Fixed(i64),
    /// Taken from the query string, or `default` when the parameter is absent.
    QueryParam {
        name: &'static str,
        default: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRoute {
    /// Path segment below `/api/`.
    pub path: &'static str,
    pub procedure: &'static str,
    pub args: &'static [ArgTemplate],
}

impl ReportRoute {
    /// Positional arguments in declaration order.
    pub fn resolve_args(&self, query: &HashMap<String, String>) -> Vec<Value> {
        self.args
            .iter()
            .map(|arg| match arg {
                ArgTemplate::Fixed(v) => Value::from(*v),
                ArgTemplate::QueryParam { name, default } => Value::from(
                    query
                        .get(*name)
                        .map(String::as_str)
                        .unwrap_or(default),
                ),
            })
            .collect()
    }

    pub fn api_path(&self) -> String {
        format!("/api/{}", self.path)
    }
}

pub static REPORTS: &[ReportRoute] = &[
    ReportRoute {
        path: "balance-financiero",
        procedure: "SP_Generar_BalanceFinanciero",
        args: &[ArgTemplate::Fixed(COMPANY_ID)],
    },
    ReportRoute {
        path: "balance-comprobacion",
        procedure: "SP_Generar_BalanceComprobacion",
        args: &[ArgTemplate::Fixed(COMPANY_ID)],
    },
    ReportRoute {
        path: "estado-resultados",
        procedure: "SP_Generar_EstadoResultados",
        args: &[ArgTemplate::Fixed(COMPANY_ID)],
    },
    ReportRoute {
        path: "movimientos-cuentas",
        procedure: "SP_Generar_MovimientosCuentas",
        args: &[
            ArgTemplate::Fixed(COMPANY_ID),
            ArgTemplate::QueryParam {
                name: "cuenta",
                default: "Bancos",
            },
            ArgTemplate::QueryParam {
                name: "inicio",
                default: "2023-01-01",
            },
            ArgTemplate::QueryParam {
                name: "fin",
                default: "2025-12-31",
            },
        ],
    },
];
