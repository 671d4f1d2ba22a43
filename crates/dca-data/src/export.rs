//! CSV export of DCA transactions.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use dca_core::error::{DashboardError, Result};
use dca_core::models::ClientTransaction;

/// Column headers, in the same order the server export uses.
pub const CSV_HEADERS: [&str; 6] = [
    "Date",
    "Amount (Sats)",
    "Amount (Fiat)",
    "Exchange Rate",
    "Type",
    "Status",
];

/// One CSV row. Fiat is converted from centavos to quetzales.
fn row(tx: &ClientTransaction) -> [String; 6] {
    [
        tx.created_at.clone(),
        tx.amount_sats.to_string(),
        format!("{:.2}", tx.amount_fiat as f64 / 100.0),
        tx.exchange_rate.to_string(),
        tx.transaction_type.clone(),
        tx.status.clone(),
    ]
}

/// Write `transactions` as CSV to any writer.
pub fn write_transactions<W: Write>(writer: W, transactions: &[ClientTransaction]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;
    for tx in transactions {
        wtr.write_record(row(tx))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render `transactions` into an in-memory CSV document.
pub fn transactions_to_csv(transactions: &[ClientTransaction]) -> Result<String> {
    let mut buf = Vec::new();
    write_transactions(&mut buf, transactions).map_err(std::io::Error::other)?;
    Ok(String::from_utf8(buf).map_err(std::io::Error::other)?)
}

/// Write `transactions` to `path`, returning the number of data rows.
pub fn export_to_file(path: &Path, transactions: &[ClientTransaction]) -> Result<usize> {
    let file = File::create(path).map_err(|e| DashboardError::CsvExport {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_transactions(file, transactions).map_err(|e| DashboardError::CsvExport {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    info!("Exported {} transactions to {}", transactions.len(), path.display());
    Ok(transactions.len())
}

/// Write a CSV document produced elsewhere (e.g. by the server) to `path`.
pub fn save_csv(path: &Path, document: &str) -> Result<()> {
    std::fs::write(path, document).map_err(|e| DashboardError::CsvExport {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tx(created_at: &str, sats: u64, fiat: i64) -> ClientTransaction {
        ClientTransaction {
            id: format!("tx-{sats}"),
            amount_sats: sats,
            amount_fiat: fiat,
            exchange_rate: 1_234.5,
            transaction_type: "flow".to_string(),
            status: "confirmed".to_string(),
            created_at: created_at.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_only_for_empty_list() {
        let csv = transactions_to_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "Date,Amount (Sats),Amount (Fiat),Exchange Rate,Type,Status\n"
        );
    }

    #[test]
    fn test_rows_convert_centavos() {
        let csv = transactions_to_csv(&[tx("2024-01-15T10:30:00", 12_345, 10_050)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "2024-01-15T10:30:00,12345,100.50,1234.5,flow,confirmed");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let mut t = tx("2024-01-15", 1, 1);
        t.transaction_type = "fixed, manual".to_string();
        let csv = transactions_to_csv(&[t]).unwrap();
        assert!(csv.contains("\"fixed, manual\""));
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let n = export_to_file(&path, &[tx("2024-01-01", 1, 100), tx("2024-01-02", 2, 200)]).unwrap();
        assert_eq!(n, 2);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADERS.to_vec());
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][2], "2.00");
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = export_to_file(&path, &[]).unwrap_err();
        assert!(matches!(err, DashboardError::CsvExport { .. }));
    }

    #[test]
    fn test_save_csv_writes_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.csv");
        save_csv(&path, "Date\n2024-01-01\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Date\n2024-01-01\n");
    }
}
