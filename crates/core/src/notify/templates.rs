//! Plain-text email bodies, in Brazilian Portuguese.

use jardim_shared::types::{Currency, Money};
use rust_decimal::Decimal;
use std::fmt::Write as _;

use crate::budget::Budget;
use crate::order::{LineItem, Order};
use crate::workflow::{BudgetStatus, OrderStatus};

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Customer-facing label of an order status.
#[must_use]
pub const fn order_status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Pendente",
        OrderStatus::Quotation => "Cotação Solicitada",
        OrderStatus::Quoted => "Cotação Enviada",
        OrderStatus::Confirmed => "Confirmado",
        OrderStatus::Processing => "Em Processamento",
        OrderStatus::Ready => "Pronto para Entrega",
        OrderStatus::Shipped => "Enviado",
        OrderStatus::Delivered => "Entregue",
        OrderStatus::Cancelled => "Cancelado",
        OrderStatus::Rejected => "Recusado",
    }
}

/// Customer-facing label of a budget status.
#[must_use]
pub const fn budget_status_label(status: BudgetStatus) -> &'static str {
    match status {
        BudgetStatus::Draft => "Rascunho",
        BudgetStatus::Sent => "Enviado",
        BudgetStatus::Accepted => "Aceito",
        BudgetStatus::Rejected => "Rejeitado",
        BudgetStatus::Expired => "Expirado",
    }
}

const fn budget_status_message(status: BudgetStatus) -> Option<&'static str> {
    match status {
        BudgetStatus::Accepted => {
            Some("Parabéns! Seu orçamento foi aceito e estará em processamento.")
        }
        BudgetStatus::Rejected => Some("Lamentamos informar que seu orçamento foi rejeitado."),
        BudgetStatus::Expired => {
            Some("Informamos que seu orçamento expirou e não está mais disponível.")
        }
        BudgetStatus::Sent => Some("Seu orçamento foi enviado para sua análise."),
        BudgetStatus::Draft => None,
    }
}

fn short_id(id: &impl ToString) -> String {
    id.to_string().chars().take(8).collect()
}

/// Renders the store's emails with its name and currency.
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    company_name: String,
    currency: Currency,
}

impl EmailTemplates {
    /// Creates templates signed by `company_name`.
    #[must_use]
    pub fn new(company_name: impl Into<String>, currency: Currency) -> Self {
        Self {
            company_name: company_name.into(),
            currency,
        }
    }

    fn money(&self, amount: Decimal) -> Money {
        Money::new(amount, self.currency)
    }

    fn push_items(&self, body: &mut String, items: &[LineItem]) {
        for item in items {
            let _ = match item.line_total() {
                Some(total) => writeln!(
                    body,
                    "- {} x{}: {}",
                    item.name,
                    item.quantity,
                    self.money(total)
                ),
                None => writeln!(body, "- {} x{}", item.name, item.quantity),
            };
        }
    }

    fn sign(&self, body: &mut String) {
        let _ = write!(body, "\nAtenciosamente,\nEquipe {}\n", self.company_name);
    }

    /// Order placed.
    #[must_use]
    pub fn order_confirmation(&self, order: &Order) -> RenderedEmail {
        let mut body = format!(
            "Olá {},\n\nRecebemos seu pedido com sucesso! Abaixo estão os detalhes:\n\n",
            order.user_info.name
        );
        self.push_items(&mut body, &order.items);
        let _ = writeln!(body, "\nTotal: {}", self.money(order.total));
        let _ = writeln!(
            body,
            "Endereço de Entrega: {}",
            order.user_info.delivery_address()
        );
        let _ = writeln!(
            body,
            "Método de Pagamento: {}",
            order.user_info.payment_method
        );
        body.push_str("\nVocê receberá atualizações sobre o status do seu pedido por e-mail.\n");
        body.push_str("Obrigado por comprar conosco!\n");
        self.sign(&mut body);

        RenderedEmail {
            subject: format!("Confirmação do Pedido #{}", order.id),
            body,
        }
    }

    /// Order changed status.
    #[must_use]
    pub fn order_status_update(&self, order: &Order) -> RenderedEmail {
        let mut body = format!(
            "Olá {},\n\nO status do seu pedido foi atualizado para: {}.\n\n",
            order.user_info.name,
            order_status_label(order.status)
        );
        body.push_str("Se você tiver alguma dúvida, entre em contato conosco.\n");
        self.sign(&mut body);

        RenderedEmail {
            subject: format!("Atualização do Pedido #{}", order.id),
            body,
        }
    }

    /// Budget created.
    #[must_use]
    pub fn budget_notification(&self, budget: &Budget, customer_name: &str) -> RenderedEmail {
        let mut body = format!(
            "Olá {customer_name},\n\nUm novo orçamento foi criado com sucesso. Abaixo estão os detalhes:\n\n"
        );
        self.push_items(&mut body, &budget.items);
        let _ = writeln!(body, "\nSubtotal: {}", self.money(budget.subtotal));
        if let Some(tax) = budget.tax {
            let _ = writeln!(body, "Impostos: {}", self.money(tax));
        }
        let _ = writeln!(body, "Total: {}", self.money(budget.total));
        let _ = writeln!(
            body,
            "Data de Validade: {}",
            budget.valid_until.format("%d/%m/%Y")
        );
        body.push_str("\nSe você tiver alguma dúvida sobre este orçamento, entre em contato conosco.\n");
        self.sign(&mut body);

        RenderedEmail {
            subject: format!("Orçamento #{} criado", short_id(&budget.id)),
            body,
        }
    }

    /// Budget changed status.
    #[must_use]
    pub fn budget_status_update(&self, budget: &Budget, customer_name: &str) -> RenderedEmail {
        let label = budget_status_label(budget.status);
        let message = budget_status_message(budget.status).map_or_else(
            || format!("Seu orçamento foi atualizado para o status: {label}."),
            str::to_string,
        );

        let mut body = format!("Olá {customer_name},\n\n{message}\n");
        let _ = writeln!(
            body,
            "O status do seu orçamento foi atualizado para: {label}.\n"
        );
        let _ = writeln!(body, "Total: {}", self.money(budget.total));
        let _ = writeln!(
            body,
            "Data de Validade: {}",
            budget.valid_until.format("%d/%m/%Y")
        );
        body.push_str("\nSe você tiver alguma dúvida, entre em contato conosco.\n");
        self.sign(&mut body);

        RenderedEmail {
            subject: format!("Atualização de Orçamento #{}", short_id(&budget.id)),
            body,
        }
    }
}
