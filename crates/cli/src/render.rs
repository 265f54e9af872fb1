// Human-readable tables for terminal output.

use std::io::{self, Write};

use meterbill_recon::aggregate::GroupTotals;
use meterbill_recon::compare::Comparison;
use meterbill_recon::summary::Summary;
use meterbill_recon::ReconciledDevice;
use meterbill_store::Record;

fn text(s: Option<&str>) -> &str {
    s.filter(|s| !s.is_empty()).unwrap_or("-")
}

pub fn devices(out: &mut dyn Write, rows: &[ReconciledDevice]) -> io::Result<()> {
    writeln!(
        out,
        "{:<14} {:<32} {:<24} {:>10} {:>8} {:>12} {:>12}  {}",
        "SERIAL", "ORG UNIT", "LOCATION", "MONO", "COLOR", "PRE-TAX", "TOTAL", "STATUS"
    )?;
    for d in rows {
        writeln!(
            out,
            "{:<14} {:<32} {:<24} {:>10} {:>8} {:>12.2} {:>12.2}  {}",
            d.serial,
            text(d.org_unit.as_deref()),
            text(d.location.as_deref()),
            d.mono,
            d.color,
            d.cost.pre_tax_total,
            d.cost.inclusive_total,
            d.status
        )?;
    }
    Ok(())
}

pub fn summary(out: &mut dyn Write, s: &Summary) -> io::Result<()> {
    writeln!(
        out,
        "{} device(s): {} matched, {} not in inventory",
        s.devices, s.matched, s.unmatched
    )?;
    writeln!(
        out,
        "impressions: {} mono, {} color ({} total)",
        s.mono,
        s.color,
        s.impressions()
    )?;
    writeln!(
        out,
        "pre-tax {:.2}  tax {:.2}  total {:.2}",
        s.pre_tax_total, s.tax_total, s.inclusive_total
    )
}

pub fn groups(out: &mut dyn Write, title: &str, groups: &[GroupTotals]) -> io::Result<()> {
    writeln!(
        out,
        "{:<32} {:>7} {:>12} {:>10} {:>12} {:>12}",
        title, "DEVICES", "IMPRESSIONS", "PER DEV", "PRE-TAX", "TOTAL"
    )?;
    for g in groups {
        let key = if g.key.is_empty() { "-" } else { g.key.as_str() };
        writeln!(
            out,
            "{:<32} {:>7} {:>12} {:>10.0} {:>12.2} {:>12.2}",
            key,
            g.devices,
            g.impressions(),
            g.impressions_per_device(),
            g.pre_tax_total,
            g.inclusive_total
        )?;
    }
    Ok(())
}

pub fn records(out: &mut dyn Write, records: &[Record]) -> io::Result<()> {
    writeln!(
        out,
        "{:<14} {:<24} {:<20} {:>7} {:>12} {:>12}",
        "ID", "LABEL", "CREATED", "DEVICES", "PRE-TAX", "TOTAL"
    )?;
    for r in records {
        let m = &r.meta;
        writeln!(
            out,
            "{:<14} {:<24} {:<20} {:>7} {:>12.2} {:>12.2}",
            m.id, m.label, m.created_at, m.device_count, m.total_pre_tax, m.total_inclusive
        )?;
    }
    Ok(())
}

pub fn comparison(out: &mut dyn Write, before: &str, after: &str, c: &Comparison) -> io::Result<()> {
    writeln!(out, "{:<24} {:>14} {:>14} {:>14}", "", before, after, "CHANGE")?;
    writeln!(
        out,
        "{:<24} {:>14} {:>14} {:>+14}",
        "devices", c.before.devices, c.after.devices, c.delta_devices
    )?;
    writeln!(
        out,
        "{:<24} {:>14} {:>14} {:>+14}",
        "impressions",
        c.before.impressions(),
        c.after.impressions(),
        c.delta_impressions
    )?;
    writeln!(
        out,
        "{:<24} {:>14.2} {:>14.2} {:>+14.2}",
        "pre-tax", c.before.pre_tax_total, c.after.pre_tax_total, c.delta_pre_tax
    )?;
    writeln!(
        out,
        "{:<24} {:>14.2} {:>14.2} {:>+14.2}",
        "total", c.before.inclusive_total, c.after.inclusive_total, c.delta_inclusive
    )?;

    if !c.by_org_unit.is_empty() {
        writeln!(out)?;
        writeln!(out, "{:<32} {:>14} {:>14} {:>14}", "ORG UNIT", before, after, "CHANGE")?;
        for u in &c.by_org_unit {
            let key = if u.org_unit.is_empty() { "-" } else { u.org_unit.as_str() };
            writeln!(
                out,
                "{:<32} {:>14.2} {:>14.2} {:>+14.2}",
                key, u.before_pre_tax, u.after_pre_tax, u.delta_pre_tax
            )?;
        }
    }
    Ok(())
}
