// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums ---

// Enum canônico de status. As camadas legadas usavam siglas inconsistentes
// (ANDA/PROC/CANC); elas são aceitas apenas na borda, via `parse_lenient`,
// e nunca circulam internamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Canceled,
}

impl OrderStatus {
    /// Estados terminais não admitem nenhuma transição de saída.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }

    /// Tabela de transições do ciclo de vida:
    /// Pending -> Processing -> Completed; Pending/Processing -> Canceled.
    /// Transição para o mesmo status é sempre permitida (no-op idempotente).
    pub fn can_transition_to(self, new: OrderStatus) -> bool {
        if self == new {
            return true;
        }
        match (self, new) {
            (OrderStatus::Pending, OrderStatus::Processing) => true,
            (OrderStatus::Processing, OrderStatus::Completed) => true,
            (OrderStatus::Pending, OrderStatus::Canceled) => true,
            (OrderStatus::Processing, OrderStatus::Canceled) => true,
            _ => false,
        }
    }

    /// Aceita o nome canônico e os sinônimos legados, sem diferenciar
    /// maiúsculas/minúsculas.
    pub fn parse_lenient(raw: &str) -> Option<OrderStatus> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PEND" => Some(OrderStatus::Pending),
            "PROCESSING" | "PROC" | "ANDA" => Some(OrderStatus::Processing),
            "COMPLETED" | "CONC" => Some(OrderStatus::Completed),
            "CANCELED" | "CANCELLED" | "CANC" => Some(OrderStatus::Canceled),
            _ => None,
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    /// Soma derivada dos totais de item; recalculada a cada mutação de item.
    #[schema(example = "150.50")]
    pub total: Decimal,
    #[schema(value_type = String, format = Date, example = "2025-01-10")]
    pub order_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-01-20")]
    pub expected_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 3)]
    pub quantity: i32,
    #[schema(example = "12.50")]
    pub unit_price: Decimal,
    #[schema(value_type = String, format = Date, example = "2026-01-01")]
    pub expiry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Total da linha: sempre derivado, nunca armazenado como verdade própria.
    pub fn line_total(&self) -> Decimal {
        line_total(self.quantity, self.unit_price)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: Order,
    pub items: Vec<OrderItem>,
}

// --- Regras puras de valoração e datas ---

pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

/// Preço unitário: mínimo 0.01, no máximo 2 casas decimais.
pub fn validate_unit_price(price: Decimal) -> Result<(), AppError> {
    let minimum = Decimal::new(1, 2); // 0.01
    if price < minimum {
        return Err(AppError::invalid_field(
            "unitPrice",
            format!("Preço unitário deve ser no mínimo 0.01 (recebido {}).", price),
        ));
    }
    if price.normalize().scale() > 2 {
        return Err(AppError::invalid_field(
            "unitPrice",
            format!("Preço unitário deve ter no máximo 2 casas decimais (recebido {}).", price),
        ));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::invalid_field(
            "quantity",
            format!("Quantidade deve ser no mínimo 1 (recebido {}).", quantity),
        ));
    }
    Ok(())
}

/// Validade de item deve estar estritamente no futuro na criação.
pub fn validate_expiry(expiry: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if expiry <= today {
        return Err(AppError::invalid_field(
            "expiryDate",
            format!("Data de validade deve ser futura (recebido {}).", expiry),
        ));
    }
    Ok(())
}

/// Invariantes de data do pedido:
/// - data do pedido não pode estar no futuro;
/// - data prevista >= data do pedido;
/// - data de entrega, se houver, dentro de [data do pedido, data prevista].
pub fn validate_order_dates(
    order_date: NaiveDate,
    expected_date: NaiveDate,
    delivery_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), AppError> {
    if order_date > today {
        return Err(AppError::invalid_field(
            "orderDate",
            format!("Data do pedido não pode estar no futuro (recebido {}).", order_date),
        ));
    }
    if expected_date < order_date {
        return Err(AppError::invalid_field(
            "expectedDate",
            format!(
                "Data prevista ({}) deve ser maior ou igual à data do pedido ({}).",
                expected_date, order_date
            ),
        ));
    }
    if let Some(delivery) = delivery_date {
        if delivery < order_date || delivery > expected_date {
            return Err(AppError::invalid_field(
                "deliveryDate",
                format!(
                    "Data de entrega ({}) deve estar entre {} e {}.",
                    delivery, order_date, expected_date
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn transicoes_validas_do_ciclo_de_vida() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Canceled));
        assert!(Processing.can_transition_to(Canceled));
    }

    #[test]
    fn transicoes_invalidas_sao_rejeitadas() {
        use OrderStatus::*;
        // Completed e Canceled são terminais
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Completed.can_transition_to(Canceled));
        assert!(!Canceled.can_transition_to(Pending));
        assert!(!Canceled.can_transition_to(Processing));
        // Sem pular etapas nem regredir
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Pending));
    }

    #[test]
    fn transicao_para_o_mesmo_status_e_permitida() {
        use OrderStatus::*;
        for s in [Pending, Processing, Completed, Canceled] {
            assert!(s.can_transition_to(s));
        }
    }

    #[test]
    fn parse_lenient_aceita_sinonimos_legados() {
        assert_eq!(OrderStatus::parse_lenient("ANDA"), Some(OrderStatus::Processing));
        assert_eq!(OrderStatus::parse_lenient("proc"), Some(OrderStatus::Processing));
        assert_eq!(OrderStatus::parse_lenient("CANC"), Some(OrderStatus::Canceled));
        assert_eq!(OrderStatus::parse_lenient("pend"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse_lenient("CONC"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse_lenient(" completed "), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse_lenient("XYZ"), None);
    }

    #[test]
    fn total_da_linha_e_quantidade_vezes_preco() {
        let total = line_total(3, Decimal::new(1250, 2)); // 3 x 12.50
        assert_eq!(total, Decimal::new(3750, 2)); // 37.50
    }

    #[test]
    fn preco_unitario_minimo_e_escala() {
        assert!(validate_unit_price(Decimal::new(1, 2)).is_ok()); // 0.01
        assert!(validate_unit_price(Decimal::new(1250, 2)).is_ok()); // 12.50
        // abaixo do mínimo
        assert!(validate_unit_price(Decimal::ZERO).is_err());
        assert!(validate_unit_price(Decimal::new(9, 3)).is_err()); // 0.009
        // mais de 2 casas decimais
        assert!(validate_unit_price(Decimal::new(12505, 3)).is_err()); // 12.505
        // zeros à direita não contam como casas extras
        assert!(validate_unit_price(Decimal::new(125000, 4)).is_ok()); // 12.5000
    }

    #[test]
    fn quantidade_minima_de_item() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn validade_deve_ser_estritamente_futura() {
        let today = date("2025-01-10");
        assert!(validate_expiry(date("2025-01-11"), today).is_ok());
        assert!(validate_expiry(today, today).is_err());
        assert!(validate_expiry(date("2024-12-31"), today).is_err());
    }

    #[test]
    fn datas_do_pedido() {
        let today = date("2025-01-15");
        // caso válido do cenário ponta-a-ponta
        assert!(validate_order_dates(date("2025-01-10"), date("2025-01-20"), None, today).is_ok());
        // data do pedido no futuro
        assert!(validate_order_dates(date("2025-02-01"), date("2025-02-10"), None, today).is_err());
        // prevista antes do pedido
        assert!(validate_order_dates(date("2025-01-10"), date("2025-01-05"), None, today).is_err());
        // entrega dentro e fora da janela
        assert!(validate_order_dates(
            date("2025-01-10"),
            date("2025-01-20"),
            Some(date("2025-01-15")),
            today
        )
        .is_ok());
        assert!(validate_order_dates(
            date("2025-01-10"),
            date("2025-01-20"),
            Some(date("2025-01-25")),
            today
        )
        .is_err());
        assert!(validate_order_dates(
            date("2025-01-10"),
            date("2025-01-20"),
            Some(date("2025-01-09")),
            today
        )
        .is_err());
    }
}
