/// Sort order for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A table read: projection, equality filters, ordering and limit.
///
/// Mirrors the subset of the data API the front end uses. Filters are
/// conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub columns: Option<Vec<String>>,
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the returned columns.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Encode as data API query parameters:
    /// `select=a,b`, `col=eq.value`, `order=col.desc`, `limit=n`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let select = match &self.columns {
            Some(cols) if !cols.is_empty() => cols.join(","),
            _ => "*".to_string(),
        };
        params.push(("select".to_string(), select));
        for (col, val) in &self.filters {
            params.push((col.clone(), format!("eq.{}", val)));
        }
        if let Some(order) = &self.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}
