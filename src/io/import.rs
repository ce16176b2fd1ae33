use std::collections::HashSet;
use std::io::Read;

use anyhow::Result;
use chrono::NaiveDate;

use crate::application::{ExpenseInput, SplitService};
use crate::domain::{PaymentMethod, parse_cents};

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
    pub skip_duplicates: bool,
    pub create_missing: bool,
}

/// Importer for loading expenses into the ledger
pub struct Importer<'a> {
    service: &'a SplitService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a SplitService) -> Self {
        Self { service }
    }

    /// Import expenses from CSV. Expected columns: expense_date, description,
    /// amount; optional: currency, category, paid_by, payment_method. The
    /// file produced by `export expenses` reads back unchanged.
    pub async fn import_expenses_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let date_col = column("expense_date");
        let description_col = column("description");
        let amount_col = column("amount");
        let currency_col = column("currency");
        let category_col = column("category");
        let paid_by_col = column("paid_by");
        let method_col = column("payment_method");

        let mut imported = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();

        // Duplicate key: (date, lowercased description, amount).
        let mut seen: HashSet<(NaiveDate, String, i64)> = self
            .service
            .list_expenses()
            .await?
            .into_iter()
            .map(|e| (e.expense_date, e.description.to_lowercase(), e.amount_cents))
            .collect();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("Malformed CSV record: {}", e),
                    });
                    continue;
                }
            };
            let field = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            };

            let Some(date_str) = field(date_col) else {
                errors.push(ImportError {
                    line,
                    field: Some("expense_date".into()),
                    error: "Missing expense date".into(),
                });
                continue;
            };
            let expense_date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                Ok(d) => d,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("expense_date".into()),
                        error: format!("Invalid date '{}': {}", date_str, e),
                    });
                    continue;
                }
            };

            let Some(description) = field(description_col) else {
                errors.push(ImportError {
                    line,
                    field: Some("description".into()),
                    error: "Missing description".into(),
                });
                continue;
            };

            let Some(amount_str) = field(amount_col) else {
                errors.push(ImportError {
                    line,
                    field: Some("amount".into()),
                    error: "Missing amount".into(),
                });
                continue;
            };
            let amount_cents = match parse_cents(amount_str) {
                Ok(cents) if cents > 0 => cents,
                Ok(_) => {
                    errors.push(ImportError {
                        line,
                        field: Some("amount".into()),
                        error: "Amount must be positive".into(),
                    });
                    continue;
                }
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("amount".into()),
                        error: format!("Invalid amount '{}': {}", amount_str, e),
                    });
                    continue;
                }
            };

            if options.skip_duplicates {
                let key = (expense_date, description.to_lowercase(), amount_cents);
                if !seen.insert(key) {
                    skipped += 1;
                    continue;
                }
            }

            let payment_method = match field(method_col) {
                Some(s) => match PaymentMethod::from_str(s) {
                    Some(m) => m,
                    None => {
                        errors.push(ImportError {
                            line,
                            field: Some("payment_method".into()),
                            error: format!("Unknown payment method '{}'", s),
                        });
                        continue;
                    }
                },
                None => PaymentMethod::default(),
            };

            let category = field(category_col).map(str::to_string);
            let paid_by = field(paid_by_col).map(str::to_string);

            if options.create_missing {
                if let Some(name) = &category {
                    self.ensure_category(name).await?;
                }
                if let Some(name) = &paid_by {
                    self.ensure_profile(name).await?;
                }
            }

            let input = ExpenseInput {
                description: description.to_string(),
                amount_cents,
                currency: field(currency_col).unwrap_or("AED").to_string(),
                expense_date: Some(expense_date),
                category,
                paid_by,
                payment_method,
            };

            if options.dry_run {
                imported += 1;
                continue;
            }

            match self.service.add_expense(input).await {
                Ok(_) => imported += 1,
                Err(e) => errors.push(ImportError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        Ok(ImportResult {
            imported,
            skipped,
            errors,
        })
    }

    async fn ensure_category(&self, name: &str) -> Result<()> {
        if self
            .service
            .list_categories()
            .await?
            .iter()
            .any(|c| c.name == name)
        {
            return Ok(());
        }
        self.service.create_category(name, "", "").await?;
        Ok(())
    }

    async fn ensure_profile(&self, name: &str) -> Result<()> {
        if self.service.get_profile(name).await.is_ok() {
            return Ok(());
        }
        self.service.create_profile(name).await?;
        Ok(())
    }
}
