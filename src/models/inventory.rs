// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Catálogo (dados mestres, somente leitura) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Dipirona 500mg")]
    pub name: String,
    #[schema(example = "12.50")]
    pub unit_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

// --- Lote ---
// Um lote pertence a exatamente um pedido e espelha exatamente um saldo
// de estoque para o par (produto, lote).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2026-01-01")]
    pub expiry_date: NaiveDate,
    #[schema(example = 3)]
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

// --- Saldo de Estoque ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockBalance {
    pub id: Uuid,
    pub product_id: Uuid,
    pub lot_id: Option<Uuid>,
    #[schema(example = 3)]
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// Aplica um delta ao saldo em mãos. O saldo nunca fica negativo: um débito
/// maior que o disponível é rejeitado e o saldo permanece intacto.
pub fn apply_delta(product_id: Uuid, on_hand: i32, delta: i32) -> Result<i32, AppError> {
    let new_quantity = on_hand + delta;
    if new_quantity < 0 {
        return Err(AppError::InsufficientStock {
            product_id,
            available: on_hand,
            requested: -delta,
        });
    }
    Ok(new_quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_positivo_acumula() {
        let p = Uuid::new_v4();
        assert_eq!(apply_delta(p, 0, 3).unwrap(), 3);
        assert_eq!(apply_delta(p, 3, 2).unwrap(), 5);
    }

    #[test]
    fn debito_ate_zero_e_permitido() {
        let p = Uuid::new_v4();
        assert_eq!(apply_delta(p, 3, -3).unwrap(), 0);
    }

    #[test]
    fn debito_alem_do_saldo_falha_e_preserva_o_saldo() {
        let p = Uuid::new_v4();
        let err = apply_delta(p, 3, -4).unwrap_err();
        match err {
            AppError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, p);
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("esperava InsufficientStock, obtive {:?}", other),
        }
    }
}
