//! Daily digest text (pt-BR)
//!
//! Currency is rendered as `R$ 1234,50`: two decimals, comma separator,
//! no thousands grouping. Downstream readers depend on this exact shape.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::models::DailySnapshot;

/// Built digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Digest {
    /// Text ready to send
    Report(String),
    /// Nothing to report for `date`; must not be sent
    NoOrders { date: NaiveDate },
}

impl Digest {
    pub fn is_report(&self) -> bool {
        matches!(self, Digest::Report(_))
    }

    /// Message text, or the human-readable "no orders" notice
    pub fn text(&self) -> String {
        match self {
            Digest::Report(text) => text.clone(),
            Digest::NoOrders { date } => {
                format!("Nenhum pedido registrado para {}.", date.format("%d/%m/%Y"))
            }
        }
    }
}

/// Build the digest for `date` from its snapshot (if any)
pub fn build(date: NaiveDate, snapshot: Option<&DailySnapshot>) -> Digest {
    let Some(s) = snapshot else {
        return Digest::NoOrders { date };
    };

    let mut lines = vec![
        "🍖 *Resumo de Vendas*".to_string(),
        format!("📅 {}, {}", weekday_pt(date.weekday()), date.format("%d/%m/%Y")),
        String::new(),
        format!("📦 Pedidos: {}", s.orders.len()),
        format!("✅ Pagos: {}", s.paid_count),
    ];
    if s.pending_count > 0 {
        lines.push(format!("⏳ Pendentes: {}", s.pending_count));
    }

    // Omitted when the printed value would be zero
    let mut items = Vec::new();
    let meat_kg = rounded(s.meat_kg, 2);
    if !meat_kg.is_zero() {
        items.push(format!("🥩 Carne: {} kg", fixed(meat_kg, 2)));
    }
    let chicken_units = rounded(s.chicken_units, 0);
    if !chicken_units.is_zero() {
        items.push(format!("🍗 Frango: {} un", fixed(chicken_units, 0)));
    }
    if !items.is_empty() {
        lines.push(String::new());
        lines.extend(items);
    }

    lines.push(String::new());
    lines.push(format!("💰 Faturamento: {}", format_brl(s.revenue)));

    Digest::Report(lines.join("\n"))
}

/// `R$ 1234,50`
pub fn format_brl(value: Decimal) -> String {
    format!("R$ {}", fixed(value, 2).replace('.', ","))
}

fn rounded(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed-point rendering with exactly `dp` decimals
fn fixed(value: Decimal, dp: u32) -> String {
    let mut v = rounded(value, dp);
    v.rescale(dp);
    v.to_string()
}

fn weekday_pt(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Segunda-feira",
        Weekday::Tue => "Terça-feira",
        Weekday::Wed => "Quarta-feira",
        Weekday::Thu => "Quinta-feira",
        Weekday::Fri => "Sexta-feira",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        // a Saturday
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn snapshot(paid: i64, pending: i64, revenue: Decimal, meat: Decimal, chicken: Decimal) -> DailySnapshot {
        DailySnapshot {
            date: date(),
            orders: Vec::new(),
            paid_count: paid,
            pending_count: pending,
            revenue,
            meat_kg: meat,
            chicken_units: chicken,
        }
    }

    #[test]
    fn test_quantities_rounding_to_zero_are_omitted() {
        let text = build(
            date(),
            Some(&snapshot(1, 0, Decimal::from(10), Decimal::new(4, 3), Decimal::new(4, 1))),
        )
        .text();
        assert!(!text.contains("Carne"));
        assert!(!text.contains("Frango"));

        let text = build(
            date(),
            Some(&snapshot(1, 0, Decimal::from(10), Decimal::new(5, 3), Decimal::new(5, 1))),
        )
        .text();
        assert!(text.contains("🥩 Carne: 0.01 kg"));
        assert!(text.contains("🍗 Frango: 1 un"));
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(Decimal::from(50)), "R$ 50,00");
        assert_eq!(format_brl(Decimal::new(123450, 2)), "R$ 1234,50");
        assert_eq!(format_brl(Decimal::new(1005, 3)), "R$ 1,01");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn test_no_orders_sentinel() {
        let digest = build(date(), None);
        assert!(!digest.is_report());
        assert_eq!(digest.text(), "Nenhum pedido registrado para 17/10/2026.");
    }

    #[test]
    fn test_full_report() {
        let s = snapshot(1, 1, Decimal::from(50), Decimal::new(12, 1), Decimal::from(3));
        let Digest::Report(text) = build(date(), Some(&s)) else {
            panic!("expected a report");
        };
        assert!(text.starts_with("🍖 *Resumo de Vendas*\n📅 Sábado, 17/10/2026\n"));
        assert!(text.contains("✅ Pagos: 1"));
        assert!(text.contains("Pendentes: 1"));
        assert!(text.contains("🥩 Carne: 1.20 kg"));
        assert!(text.contains("🍗 Frango: 3 un"));
        assert!(text.ends_with("💰 Faturamento: R$ 50,00"));
    }

    #[test]
    fn test_omits_zero_lines() {
        let s = snapshot(2, 0, Decimal::new(8050, 2), Decimal::ZERO, Decimal::from(4));
        let text = build(date(), Some(&s)).text();
        assert!(!text.contains("Pendentes"));
        assert!(!text.contains("Carne"));
        assert!(text.contains("🍗 Frango: 4 un"));
        assert!(text.contains("R$ 80,50"));
    }

    #[test]
    fn test_weekday_names() {
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let s = snapshot(0, 1, Decimal::ZERO, Decimal::ONE, Decimal::ZERO);
        assert!(build(sunday, Some(&s)).text().contains("📅 Domingo, 18/10/2026"));
    }
}
