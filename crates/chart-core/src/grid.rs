// File: crates/chart-core/src/grid.rs
// Summary: Tick layout helpers: nice linear ticks, log decade ticks, calendar time ticks and their labels.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

/// Returns (i1, i2, inc). A negative `inc` means ticks are `i / -inc`.
fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        i1 = (start * inv).round();
        i2 = (stop * inv).round();
        if i1 / inv < start {
            i1 += 1.0;
        }
        if i2 / inv > stop {
            i2 -= 1.0;
        }
        inc = -inv;
    } else {
        let fwd = 10f64.powf(power) * factor;
        i1 = (start / fwd).round();
        i2 = (stop / fwd).round();
        if i1 * fwd < start {
            i1 += 1.0;
        }
        if i2 * fwd > stop {
            i2 -= 1.0;
        }
        inc = fwd;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

fn ticks_f(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count);
    if !(i2 >= i1) {
        return Vec::new();
    }
    let n = (i2 - i1 + 1.0) as usize;
    let mut out: Vec<f64> = (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 { k / -inc } else { k * inc }
        })
        .collect();
    if reverse {
        out.reverse();
    }
    out
}

/// Roughly `count` evenly spaced "nice" values (1, 2 or 5 × 10ⁿ steps) within `[start, stop]`.
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    ticks_f(start, stop, count as f64)
}

/// Ticks for a base-10 log domain. Short domains get every 1..9 multiple of each
/// decade, long ones only powers of ten.
pub fn log_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    let reverse = stop < start;
    let (u, v) = if reverse { (stop, start) } else { (start, stop) };
    if !(u > 0.0) || !v.is_finite() {
        return Vec::new();
    }
    let (i, j) = (u.log10(), v.log10());
    let n = count as f64;
    let mut z = Vec::new();
    if j - i < n {
        'decades: for e in (i.floor() as i32)..=(j.ceil() as i32) {
            for k in 1..10 {
                let t = if e < 0 { k as f64 / 10f64.powi(-e) } else { k as f64 * 10f64.powi(e) };
                if t < u {
                    continue;
                }
                if t > v {
                    break 'decades;
                }
                z.push(t);
            }
        }
        if z.len() * 2 < count {
            z = linear_ticks(u, v, count);
        }
    } else {
        z = ticks_f(i, j, (j - i).min(n)).into_iter().map(|p| 10f64.powf(p)).collect();
    }
    if reverse {
        z.reverse();
    }
    z
}

/// Integer label (`d` format): rounded, no grouping.
pub fn format_integer(v: f64) -> String {
    let r = v.round();
    if r == 0.0 { "0".to_string() } else { format!("{}", r as i64) }
}

/// Integer labels for log ticks, blanking multiples that would crowd the axis.
pub fn log_tick_labels(start: f64, stop: f64, ticks: &[f64], count: usize) -> Vec<String> {
    let reference = log_ticks(start, stop, 10).len().max(1);
    let k = (10.0 * count as f64 / reference as f64).max(1.0);
    ticks
        .iter()
        .map(|&d| {
            let mut i = d / 10f64.powf(d.log10().round());
            if i * 10.0 < 10.0 - 0.5 {
                i *= 10.0;
            }
            if i <= k + 1e-9 { format_integer(d) } else { String::new() }
        })
        .collect()
}

// ---- calendar ticks ---------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Clone, Copy, Debug)]
struct Interval {
    unit: Unit,
    step: u32,
    approx_ms: f64,
}

const HOUR_MS: f64 = 3_600_000.0;
const DAY_MS: f64 = 24.0 * HOUR_MS;

const INTERVALS: [Interval; 10] = [
    Interval { unit: Unit::Hour, step: 1, approx_ms: HOUR_MS },
    Interval { unit: Unit::Hour, step: 3, approx_ms: 3.0 * HOUR_MS },
    Interval { unit: Unit::Hour, step: 6, approx_ms: 6.0 * HOUR_MS },
    Interval { unit: Unit::Hour, step: 12, approx_ms: 12.0 * HOUR_MS },
    Interval { unit: Unit::Day, step: 1, approx_ms: DAY_MS },
    Interval { unit: Unit::Day, step: 2, approx_ms: 2.0 * DAY_MS },
    Interval { unit: Unit::Week, step: 1, approx_ms: 7.0 * DAY_MS },
    Interval { unit: Unit::Month, step: 1, approx_ms: 30.0 * DAY_MS },
    Interval { unit: Unit::Month, step: 3, approx_ms: 90.0 * DAY_MS },
    Interval { unit: Unit::Year, step: 1, approx_ms: 365.0 * DAY_MS },
];

fn pick_interval(span_ms: f64, count: usize) -> Interval {
    let target = span_ms / count.max(1) as f64;
    let i = INTERVALS.partition_point(|iv| iv.approx_ms <= target);
    if i == 0 {
        return INTERVALS[0];
    }
    if i == INTERVALS.len() {
        let years = span_ms / INTERVALS[INTERVALS.len() - 1].approx_ms;
        let step = linear_ticks(0.0, years, count)
            .windows(2)
            .next()
            .map(|w| (w[1] - w[0]).round().max(1.0) as u32)
            .unwrap_or(1);
        return Interval { unit: Unit::Year, step, approx_ms: step as f64 * 365.0 * DAY_MS };
    }
    let (lo, hi) = (INTERVALS[i - 1], INTERVALS[i]);
    if target / lo.approx_ms < hi.approx_ms / target { lo } else { hi }
}

fn midnight(d: NaiveDate) -> NaiveDateTime {
    d.and_hms_opt(0, 0, 0).unwrap_or_default()
}

fn floor_to(unit: Unit, t: NaiveDateTime) -> NaiveDateTime {
    match unit {
        Unit::Hour => t.date().and_hms_opt(t.hour(), 0, 0).unwrap_or(t),
        Unit::Day => midnight(t.date()),
        Unit::Week => {
            let back = t.weekday().num_days_from_sunday() as i64;
            midnight(t.date() - Duration::days(back))
        }
        Unit::Month => midnight(t.date().with_day(1).unwrap_or(t.date())),
        Unit::Year => midnight(NaiveDate::from_ymd_opt(t.year(), 1, 1).unwrap_or(t.date())),
    }
}

fn advance(unit: Unit, t: NaiveDateTime) -> Option<NaiveDateTime> {
    match unit {
        Unit::Hour => t.checked_add_signed(Duration::hours(1)),
        Unit::Day => t.checked_add_signed(Duration::days(1)),
        Unit::Week => t.checked_add_signed(Duration::days(7)),
        Unit::Month => t.checked_add_months(Months::new(1)),
        Unit::Year => t.checked_add_months(Months::new(12)),
    }
}

fn on_step(iv: Interval, t: NaiveDateTime) -> bool {
    let step = iv.step.max(1);
    match iv.unit {
        Unit::Hour => t.hour() % step == 0,
        Unit::Day => (t.day() - 1) % step == 0,
        Unit::Week => true,
        Unit::Month => t.month0() % step == 0,
        Unit::Year => t.year().rem_euclid(step as i32) == 0,
    }
}

/// Calendar-aligned ticks inside `[start, stop]`, about `count` of them.
pub fn time_ticks(start: NaiveDateTime, stop: NaiveDateTime, count: usize) -> Vec<NaiveDateTime> {
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let span_ms = (hi - lo).num_milliseconds() as f64;
    if span_ms <= 0.0 {
        return vec![lo];
    }
    let iv = pick_interval(span_ms, count);
    let mut out = Vec::new();
    let mut t = floor_to(iv.unit, lo);
    while t <= hi {
        if t >= lo && on_step(iv, t) {
            out.push(t);
        }
        match advance(iv.unit, t) {
            Some(next) => t = next,
            None => break,
        }
    }
    out
}

/// Multi-scale label: the coarsest calendar boundary the tick sits on decides the format.
pub fn time_tick_label(t: &NaiveDateTime) -> String {
    let fmt = if t.second() != 0 || t.nanosecond() != 0 {
        ":%S"
    } else if t.minute() != 0 {
        "%I:%M"
    } else if t.hour() != 0 {
        "%I %p"
    } else if t.day() != 1 {
        if floor_to(Unit::Week, *t) < *t { "%a %d" } else { "%b %d" }
    } else if t.month() != 1 {
        "%B"
    } else {
        "%Y"
    };
    t.format(fmt).to_string()
}
