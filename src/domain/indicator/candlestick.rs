//! Candlestick pattern detectors.
//!
//! Each detector inspects the geometry of the last bar (the last two for
//! engulfing) and returns a signed flag: +100 bullish, -100 bearish, 0 none.

use crate::domain::ohlcv::Bar;
use std::fmt;

pub const BULLISH: i32 = 100;
pub const BEARISH: i32 = -100;
pub const NONE: i32 = 0;

/// Body no larger than this share of the range counts as a doji.
const DOJI_BODY_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandlePattern {
    Doji,
    Hammer,
    ShootingStar,
    Engulfing,
}

impl CandlePattern {
    pub const ALL: [CandlePattern; 4] = [
        CandlePattern::Doji,
        CandlePattern::Hammer,
        CandlePattern::ShootingStar,
        CandlePattern::Engulfing,
    ];

    /// Flag for the last bar of `bars`, or `None` when there are too few bars.
    pub fn detect(self, bars: &[Bar]) -> Option<i32> {
        match self {
            CandlePattern::Doji => bars.last().map(doji),
            CandlePattern::Hammer => bars.last().map(hammer),
            CandlePattern::ShootingStar => bars.last().map(shooting_star),
            CandlePattern::Engulfing => match bars {
                [.., prev, last] => Some(engulfing(prev, last)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandlePattern::Doji => "DOJI",
            CandlePattern::Hammer => "HAMMER",
            CandlePattern::ShootingStar => "SHOOTING_STAR",
            CandlePattern::Engulfing => "ENGULFING",
        };
        f.write_str(name)
    }
}

pub fn doji(bar: &Bar) -> i32 {
    let range = bar.range();
    if range > 0.0 && bar.body() <= range * DOJI_BODY_RATIO {
        BULLISH
    } else {
        NONE
    }
}

/// Long lower shadow, small body, little upper shadow.
pub fn hammer(bar: &Bar) -> i32 {
    let (body, upper, lower) = (bar.body(), bar.upper_shadow(), bar.lower_shadow());
    if body < lower * 0.5 && lower > upper * 2.0 {
        BULLISH
    } else {
        NONE
    }
}

/// Long upper shadow, small body, little lower shadow.
pub fn shooting_star(bar: &Bar) -> i32 {
    let (body, upper, lower) = (bar.body(), bar.upper_shadow(), bar.lower_shadow());
    if body < upper * 0.5 && upper > lower * 2.0 {
        BEARISH
    } else {
        NONE
    }
}

pub fn engulfing(prev: &Bar, last: &Bar) -> i32 {
    let engulfs = last.body() > prev.body()
        && last.open.max(last.close) >= prev.open.max(prev.close)
        && last.open.min(last.close) <= prev.open.min(prev.close);
    if !engulfs {
        NONE
    } else if last.is_green() && prev.is_red() {
        BULLISH
    } else if last.is_red() && prev.is_green() {
        BEARISH
    } else {
        NONE
    }
}
