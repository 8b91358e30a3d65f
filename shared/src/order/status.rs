//! Status and payment enums for service orders

use serde::{Deserialize, Serialize};

// ============================================================================
// Technical Status
// ============================================================================

/// Repair-workflow state of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechnicalStatus {
    /// Budget sent, waiting for the customer
    #[default]
    AwaitingConfirmation,
    Approved,
    /// Repair finished, waiting for pickup
    Ready,
    Delivered,
    Rejected,
}

impl TechnicalStatus {
    pub const ALL: [TechnicalStatus; 5] = [
        Self::AwaitingConfirmation,
        Self::Approved,
        Self::Ready,
        Self::Delivered,
        Self::Rejected,
    ];

    /// Display label (pt-BR, as printed on the order)
    pub fn label(&self) -> &'static str {
        match self {
            Self::AwaitingConfirmation => "Aguardando confirmação",
            Self::Approved => "Aprovado",
            Self::Ready => "Pronto",
            Self::Delivered => "Entregue",
            Self::Rejected => "Reprovado",
        }
    }

    /// Wire code, e.g. `AWAITING_CONFIRMATION`
    pub fn code(&self) -> &'static str {
        match self {
            Self::AwaitingConfirmation => "AWAITING_CONFIRMATION",
            Self::Approved => "APPROVED",
            Self::Ready => "READY",
            Self::Delivered => "DELIVERED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parse a wire code or a kebab-case name (`awaiting-confirmation`)
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().replace('-', "_").to_uppercase();
        Self::ALL.into_iter().find(|s| s.code() == normalized)
    }
}

impl std::fmt::Display for TechnicalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Financial Status
// ============================================================================

/// Payment state of an order, independent of the technical status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialStatus {
    #[default]
    Open,
    Paid,
    PartiallyPaid,
    Owing,
    Invoiced,
    Overdue,
    Cancelled,
}

impl FinancialStatus {
    pub const ALL: [FinancialStatus; 7] = [
        Self::Open,
        Self::Paid,
        Self::PartiallyPaid,
        Self::Owing,
        Self::Invoiced,
        Self::Overdue,
        Self::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Em aberto",
            Self::Paid => "Pago",
            Self::PartiallyPaid => "Pago parcialmente",
            Self::Owing => "Devendo",
            Self::Invoiced => "Faturado",
            Self::Overdue => "Vencido",
            Self::Cancelled => "Cancelado",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Paid => "PAID",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::Owing => "OWING",
            Self::Invoiced => "INVOICED",
            Self::Overdue => "OVERDUE",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().replace('-', "_").to_uppercase();
        Self::ALL.into_iter().find(|s| s.code() == normalized)
    }
}

impl std::fmt::Display for FinancialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Payment
// ============================================================================

/// How the order is paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    /// À vista
    #[default]
    Cash,
    /// Parcelado (1-12 installments)
    Installment,
    /// Crediário da loja
    StoreCredit,
}

impl PaymentType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "À vista",
            Self::Installment => "Parcelado",
            Self::StoreCredit => "Crediário",
        }
    }
}

/// Payment instrument
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Debit,
    Credit,
    Cash,
    Pix,
    Boleto,
    Transfer,
    Check,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Debit => "Cartão de débito",
            Self::Credit => "Cartão de crédito",
            Self::Cash => "Dinheiro",
            Self::Pix => "PIX",
            Self::Boleto => "Boleto",
            Self::Transfer => "Transferência",
            Self::Check => "Cheque",
        }
    }
}
