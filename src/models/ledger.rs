// src/models/ledger.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Lançamento contábil (uma linha de partida dobrada) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    /// Número do lançamento, compartilhado pelo par débito/crédito.
    #[schema(example = 42)]
    pub lancamento: i64,
    #[schema(value_type = String, format = Date, example = "2025-01-12")]
    pub posting_date: NaiveDate,
    pub order_id: Option<Uuid>,
    pub sale_item_id: Option<Uuid>,
    #[schema(example = "estoque")]
    pub account: String,
    #[schema(example = "37.50")]
    pub debit: Decimal,
    #[schema(example = "0.00")]
    pub credit: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Linha ainda não persistida de um lançamento.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerEntry {
    pub posting_date: NaiveDate,
    pub order_id: Option<Uuid>,
    pub account: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Constrói o par débito/crédito de um lançamento. O balanceamento é
/// garantido por construção: uma linha só-débito e uma linha só-crédito,
/// ambas do mesmo valor.
pub fn balanced_pair(
    debit_account: &str,
    credit_account: &str,
    amount: Decimal,
    posting_date: NaiveDate,
    order_id: Option<Uuid>,
) -> Result<(NewLedgerEntry, NewLedgerEntry), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::invalid_field(
            "amount",
            format!("Valor do lançamento deve ser positivo (recebido {}).", amount),
        ));
    }
    if debit_account.trim().is_empty() || credit_account.trim().is_empty() {
        return Err(AppError::invalid_field(
            "account",
            "Contas de débito e crédito são obrigatórias.".to_string(),
        ));
    }
    let debit_row = NewLedgerEntry {
        posting_date,
        order_id,
        account: debit_account.to_string(),
        debit: amount,
        credit: Decimal::ZERO,
    };
    let credit_row = NewLedgerEntry {
        posting_date,
        order_id,
        account: credit_account.to_string(),
        debit: Decimal::ZERO,
        credit: amount,
    };
    Ok((debit_row, credit_row))
}

// --- Reconciliação ---
// O modelo de dados admite linhas mistas (débito e crédito na mesma linha);
// `post_balanced_entry` nunca as produz, mas a consulta de reconciliação
// precisa reportá-las para revisão do operador.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnbalancedPosting {
    #[schema(example = 42)]
    pub lancamento: i64,
    #[schema(example = "37.50")]
    pub total_debit: Decimal,
    #[schema(example = "30.00")]
    pub total_credit: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn par_balanceado_por_construcao() {
        let amount = Decimal::new(3750, 2); // 37.50
        let (d, c) =
            balanced_pair("estoque", "fornecedores", amount, date("2025-01-12"), None).unwrap();

        // soma dos débitos == soma dos créditos
        assert_eq!(d.debit + c.debit, d.credit + c.credit);
        // uma linha só-débito, uma só-crédito
        assert_eq!(d.debit, amount);
        assert_eq!(d.credit, Decimal::ZERO);
        assert_eq!(c.credit, amount);
        assert_eq!(c.debit, Decimal::ZERO);
        assert_eq!(d.account, "estoque");
        assert_eq!(c.account, "fornecedores");
    }

    #[test]
    fn par_carrega_o_vinculo_com_o_pedido() {
        let order_id = Uuid::new_v4();
        let (d, c) = balanced_pair(
            "estoque",
            "fornecedores",
            Decimal::ONE,
            date("2025-01-12"),
            Some(order_id),
        )
        .unwrap();
        assert_eq!(d.order_id, Some(order_id));
        assert_eq!(c.order_id, Some(order_id));
    }

    #[test]
    fn valor_nao_positivo_e_rejeitado() {
        assert!(balanced_pair("a", "b", Decimal::ZERO, date("2025-01-12"), None).is_err());
        assert!(balanced_pair("a", "b", Decimal::new(-100, 2), date("2025-01-12"), None).is_err());
    }

    #[test]
    fn contas_vazias_sao_rejeitadas() {
        assert!(balanced_pair("", "b", Decimal::ONE, date("2025-01-12"), None).is_err());
        assert!(balanced_pair("a", "  ", Decimal::ONE, date("2025-01-12"), None).is_err());
    }
}
