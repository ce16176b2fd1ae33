use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::SplitService;
use crate::domain::{Category, Expense, Profile, Settlement, format_cents};

/// Database snapshot for full export. Accounts and sessions are deliberately
/// left out: credentials don't belong in a data dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub profiles: Vec<Profile>,
    pub categories: Vec<Category>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    service: &'a SplitService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a SplitService) -> Self {
        Self { service }
    }

    async fn profile_names(&self) -> Result<HashMap<uuid::Uuid, String>> {
        Ok(self
            .service
            .list_profiles()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect())
    }

    /// Export expenses to CSV format
    pub async fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let expenses = self.service.list_expenses().await?;
        let names = self.profile_names().await?;
        let categories: HashMap<uuid::Uuid, String> = self
            .service
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "id",
            "expense_date",
            "description",
            "amount",
            "currency",
            "category",
            "paid_by",
            "payment_method",
        ])?;

        let mut count = 0;
        for expense in &expenses {
            csv_writer.write_record([
                expense.id.to_string(),
                expense.expense_date.to_string(),
                expense.description.clone(),
                format_cents(expense.amount_cents),
                expense.currency.clone(),
                expense
                    .category_id
                    .and_then(|id| categories.get(&id).cloned())
                    .unwrap_or_default(),
                expense
                    .paid_by
                    .and_then(|id| names.get(&id).cloned())
                    .unwrap_or_default(),
                expense.payment_method.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export settlements to CSV format
    pub async fn export_settlements_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let settlements = self.service.list_settlements().await?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "id",
            "settlement_date",
            "from",
            "to",
            "amount",
            "description",
        ])?;

        let mut count = 0;
        for detail in &settlements {
            csv_writer.write_record([
                detail.settlement.id.to_string(),
                detail.settlement.settlement_date.to_string(),
                detail.from_name.clone(),
                detail.to_name.clone(),
                format_cents(detail.settlement.amount_cents),
                detail.settlement.description.clone().unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the balance summary to CSV format
    pub async fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let balances = self.service.balance_summary().await?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "name",
            "paid",
            "share",
            "settlement_credit",
            "repaid",
            "received",
            "balance",
            "standing",
        ])?;

        let mut count = 0;
        for member in &balances {
            csv_writer.write_record([
                member.name.clone(),
                format_cents(member.paid),
                format_cents(member.share),
                format_cents(member.settlement_credit),
                format_cents(member.repaid),
                format_cents(member.received),
                format_cents(member.balance),
                member.standing().to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full database as a JSON snapshot
    pub async fn export_snapshot_json<W: Write>(&self, writer: W) -> Result<()> {
        let snapshot = DatabaseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            profiles: self.service.list_profiles().await?,
            categories: self.service.list_categories().await?,
            expenses: self.service.list_expenses().await?,
            settlements: self
                .service
                .list_settlements()
                .await?
                .into_iter()
                .map(|d| d.settlement)
                .collect(),
        };

        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(())
    }
}
