use crate::models::Offer;
use serde::{Deserialize, Serialize};

/// 计算单位价格时使用哪一个价格
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceBasis {
    /// 三个价格中最高的那个
    #[default]
    Effective,
    /// 最低新品价
    Lowest,
}

/// 价格提取结果 (主货币单位)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSet {
    pub list_price: f64,
    pub lowest_price: f64,
    pub expedited_price: f64,
    pub is_expedited_eligible: bool,
    pub effective_price: f64,
    pub price_per_part: f64,
    pub price_per_weight_unit: f64,
}

/// 最小货币单位字符串 -> 主货币单位; 无法解析时为 0
pub fn parse_minor_units(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }
    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() => amount / 100.0,
        _ => {
            tracing::debug!("Unparsable price amount `{}`, using 0", raw);
            0.0
        }
    }
}

/// 取 {list, expedited, lowest} 降序排序后的第一个
pub fn effective_price(list_price: f64, expedited_price: f64, lowest_price: f64) -> f64 {
    let mut prices = [list_price, expedited_price, lowest_price];
    prices.sort_by(|a, b| b.total_cmp(a));
    prices[0]
}

/// 汇总价格字段并计算单位价格
pub fn extract(
    raw_list_price: &str,
    raw_lowest_price: &str,
    offers: &[Offer],
    part_count: u32,
    weight_grams: u32,
    basis: PriceBasis,
) -> PriceSet {
    let list_price = parse_minor_units(raw_list_price);
    let lowest_price = parse_minor_units(raw_lowest_price);

    // 只取第一个可加急配送的报价
    let (is_expedited_eligible, expedited_price) = offers
        .iter()
        .find(|offer| offer.is_expedited_eligible)
        .map(|offer| (true, offer.amount_minor_units as f64 / 100.0))
        .unwrap_or((false, 0.0));

    let effective_price = effective_price(list_price, expedited_price, lowest_price);
    let basis_price = match basis {
        PriceBasis::Effective => effective_price,
        PriceBasis::Lowest => lowest_price,
    };

    let price_per_part = if part_count > 0 {
        basis_price / f64::from(part_count)
    } else {
        0.0
    };
    let price_per_weight_unit = if weight_grams > 0 {
        basis_price / f64::from(weight_grams)
    } else {
        0.0
    };

    PriceSet {
        list_price,
        lowest_price,
        expedited_price,
        is_expedited_eligible,
        effective_price,
        price_per_part,
        price_per_weight_unit,
    }
}

/// 解析详情页的重量字段, 返回克数
///
/// `kg` 标注的值乘以 100 后向下取整 (沿用历史换算, 并非 1000), 其余按克处理, 只取数字。
pub fn parse_weight_grams(raw: &str) -> Option<u32> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    if let Some(idx) = lower.find("kg") {
        let number = lower[..idx].trim().replace(',', ".");
        let kilos: f64 = number.parse().ok()?;
        if !kilos.is_finite() || kilos < 0.0 {
            return None;
        }
        return Some((kilos * 100.0).floor() as u32);
    }

    let digits: String = lower.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// 解析零件数 ("1.254 Teile" -> 1254)
pub fn parse_part_count(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(amount: i64, expedited: bool) -> Offer {
        Offer {
            amount_minor_units: amount,
            is_expedited_eligible: expedited,
        }
    }

    #[test]
    fn minor_units_divide_by_hundred() {
        assert!((parse_minor_units("12345") - 123.45).abs() < 1e-9);
        assert_eq!(parse_minor_units("abc"), 0.0);
        assert_eq!(parse_minor_units(""), 0.0);
    }

    #[test]
    fn first_expedited_offer_wins() {
        let offers = vec![offer(5000, false), offer(4200, true), offer(3900, true)];
        let prices = extract("4999", "3999", &offers, 0, 0, PriceBasis::Effective);
        assert!(prices.is_expedited_eligible);
        assert!((prices.expedited_price - 42.0).abs() < 1e-9);
    }

    #[test]
    fn no_expedited_offer_leaves_zero() {
        let offers = vec![offer(5000, false)];
        let prices = extract("4999", "3999", &offers, 100, 0, PriceBasis::Effective);
        assert!(!prices.is_expedited_eligible);
        assert_eq!(prices.expedited_price, 0.0);
    }

    #[test]
    fn effective_price_is_the_highest() {
        assert_eq!(effective_price(10.0, 30.0, 20.0), 30.0);
        assert_eq!(effective_price(0.0, 0.0, 0.0), 0.0);

        let prices = extract("4999", "3999", &[offer(5500, true)], 0, 0, PriceBasis::Effective);
        assert!((prices.effective_price - 55.0).abs() < 1e-9);
    }

    #[test]
    fn per_unit_metrics_need_positive_denominators() {
        let prices = extract("", "18000", &[], 180, 0, PriceBasis::Lowest);
        assert!((prices.price_per_part - 1.0).abs() < 1e-9);
        assert_eq!(prices.price_per_weight_unit, 0.0);

        let prices = extract("", "18000", &[], 0, 450, PriceBasis::Effective);
        assert_eq!(prices.price_per_part, 0.0);
        assert!((prices.price_per_weight_unit - 0.4).abs() < 1e-9);
    }

    #[test]
    fn kilogram_weight_uses_historical_scaling() {
        assert_eq!(parse_weight_grams("2,5 Kg"), Some(250));
        assert_eq!(parse_weight_grams("1.25 kg"), Some(125));
        assert_eq!(parse_weight_grams("450 g"), Some(450));
        assert_eq!(parse_weight_grams("Gewicht unbekannt"), None);
        assert_eq!(parse_weight_grams(""), None);
    }

    #[test]
    fn part_count_takes_digits() {
        assert_eq!(parse_part_count("1.254"), Some(1254));
        assert_eq!(parse_part_count("180 Teile"), Some(180));
        assert_eq!(parse_part_count("n/a"), None);
    }
}
