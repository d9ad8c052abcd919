use thiserror::Error;

/// Why a candidate comparison produced no report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("bookmaker or exchange has no usable price")]
    InputAbsent,
    #[error("comparative odds or qualifying loss outside limits")]
    NoOpportunity,
    #[error("lay odds do not exceed commission")]
    DegenerateMath,
}

/// The lay bet that hedges a back bet, with the figures used to rank it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hedge {
    pub lay_stake: f64,
    pub qualifying_loss: f64,
    pub profit: f64,
    pub comparative_odds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Comparative odds must be strictly above this.
    pub odds_limit: f64,
    /// Maximum qualifying loss; `None` or a non-positive value disables the cap.
    pub ql_limit: Option<f64>,
}

impl Thresholds {
    pub fn new(odds_limit: f64, ql_limit: Option<f64>) -> Self {
        Self {
            odds_limit,
            ql_limit,
        }
    }

    pub fn accepts(&self, hedge: &Hedge) -> bool {
        if hedge.comparative_odds <= self.odds_limit {
            return false;
        }
        match self.ql_limit {
            Some(cap) if cap > 0.0 => hedge.qualifying_loss <= cap,
            _ => true,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Size the lay bet for `back_stake` at `back_odds` against `lay_odds`.
///
/// The qualifying loss is taken from the unrounded lay stake while the profit
/// uses the rounded one, and the comparative odds divide the unrounded profit
/// by the rounded loss. Published figures depend on that order.
pub fn hedge(
    back_stake: f64,
    back_odds: f64,
    lay_odds: f64,
    commission: f64,
) -> Result<Hedge, SkipReason> {
    let denominator = lay_odds - commission;
    if !denominator.is_finite() || denominator <= 0.0 {
        return Err(SkipReason::DegenerateMath);
    }

    let raw_lay_stake = (back_stake * back_odds) / denominator;
    let lay_stake = round2(raw_lay_stake);
    let qualifying_loss = round2(back_stake - raw_lay_stake * (1.0 - commission));

    // Winnings if the price shortens and the back bet is traded out.
    let raw_profit = back_stake * (back_odds - 1.0) + lay_stake * (1.0 - commission);
    let comparative_odds = if qualifying_loss > 0.0 {
        round2(1.0 + raw_profit / qualifying_loss)
    } else {
        0.0
    };

    let out = Hedge {
        lay_stake,
        qualifying_loss,
        profit: round2(raw_profit),
        comparative_odds,
    };
    if [out.lay_stake, out.qualifying_loss, out.profit, out.comparative_odds]
        .iter()
        .all(|v| v.is_finite())
    {
        Ok(out)
    } else {
        Err(SkipReason::DegenerateMath)
    }
}

/// Hedge and filter in one step.
pub fn assess(
    back_stake: f64,
    back_odds: f64,
    lay_odds: f64,
    commission: f64,
    thresholds: &Thresholds,
) -> Result<Hedge, SkipReason> {
    let hedge = hedge(back_stake, back_odds, lay_odds, commission)?;
    if thresholds.accepts(&hedge) {
        Ok(hedge)
    } else {
        Err(SkipReason::NoOpportunity)
    }
}
