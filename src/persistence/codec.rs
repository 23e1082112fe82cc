//! The flat, comma separated checkpoint record of a network.
//!
//! ```text
//! inputWidth,inputHeight,kind,trainedSeconds,regionW,regionH,regionX,regionY,focusW,focusH,focusX,focusY
//! inputUnitCount
//! <one row of weights per input unit>
//! hiddenLayerCount
//! layerUnitCount          (per layer)
//! bias                    (per unit)
//! <weights>               (per unit)
//! outputUnitCount
//! label,bias              (per output unit)
//! ```
//!
//! A missing focus region is written as zeros.

use std::{
    io::{Read, Write},
    str::FromStr,
};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, WriterBuilder};

use crate::{
    neural_net::{HiddenUnit, InputUnit, Layer, NetKind, Network, OutputUnit, Rect},
    KeyIdentifier, NetErr, Result,
};

/// Writes `net` as a checkpoint record.
pub fn encode<W: Write>(net: &Network, writer: W) -> Result<()> {
    let mut w = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    let region = net.region();
    let focus = net.focus().unwrap_or_default();
    w.write_record([
        net.input_width().to_string(),
        net.input_height().to_string(),
        net.kind().to_string(),
        net.trained_secs().to_string(),
        region.width.to_string(),
        region.height.to_string(),
        region.x.to_string(),
        region.y.to_string(),
        focus.width.to_string(),
        focus.height.to_string(),
        focus.x.to_string(),
        focus.y.to_string(),
    ])?;

    w.write_record([net.inputs().len().to_string()])?;
    for input in net.inputs() {
        w.write_record(input.weights().iter().map(f64::to_string))?;
    }

    w.write_record([net.hidden_layers().len().to_string()])?;
    for layer in net.hidden_layers() {
        w.write_record([layer.size().to_string()])?;
        for unit in layer.units() {
            w.write_record([unit.bias().to_string()])?;
            w.write_record(unit.weights().iter().map(f64::to_string))?;
        }
    }

    w.write_record([net.outputs().len().to_string()])?;
    for output in net.outputs() {
        w.write_record([output.label().name().to_string(), output.bias().to_string()])?;
    }

    w.flush()?;
    Ok(())
}

/// Reads a checkpoint record back into a network named `name`.
///
/// Nothing is returned unless the whole record parses and the rebuilt network holds every
/// structural invariant.
pub fn decode<R: Read>(name: &str, reader: R) -> Result<Network> {
    let mut rows = Rows::new(reader);

    let header = rows.next_row()?;
    let width: usize = rows.field(&header, 0, "input width")?;
    let height: usize = rows.field(&header, 1, "input height")?;
    let kind: NetKind = rows.field(&header, 2, "network kind")?;
    let trained_secs: u64 = rows.field(&header, 3, "trained seconds")?;
    let region = Rect::new(
        rows.field(&header, 6, "region x")?,
        rows.field(&header, 7, "region y")?,
        rows.field(&header, 4, "region width")?,
        rows.field(&header, 5, "region height")?,
    );
    let focus = Rect::new(
        rows.field(&header, 10, "focus x")?,
        rows.field(&header, 11, "focus y")?,
        rows.field(&header, 8, "focus width")?,
        rows.field(&header, 9, "focus height")?,
    );

    let input_count = rows.count("input unit count")?;
    let mut inputs = Vec::new();
    for _ in 0..input_count {
        inputs.push(InputUnit::new(rows.floats()?));
    }

    let layer_count = rows.count("hidden layer count")?;
    let mut hidden = Vec::new();
    for _ in 0..layer_count {
        let unit_count = rows.count("layer unit count")?;
        let mut units = Vec::new();
        for _ in 0..unit_count {
            let row = rows.next_row()?;
            let bias = rows.finite(&row, 0, "hidden bias")?;
            units.push(HiddenUnit::new(bias, rows.floats()?));
        }
        hidden.push(Layer::new(units));
    }

    let output_count = rows.count("output unit count")?;
    let mut outputs = Vec::new();
    for _ in 0..output_count {
        let row = rows.next_row()?;
        let label: KeyIdentifier = rows.field(&row, 0, "output label")?;
        let bias = rows.finite(&row, 1, "output bias")?;
        outputs.push(OutputUnit::new(label, bias));
    }

    if let Some(extra) = rows.records.next() {
        let line = extra?.position().map_or(rows.line + 1, |p| p.line());
        return Err(NetErr::Malformed {
            line,
            reason: "unexpected rows after the output units".into(),
        });
    }

    let mut net = Network::from_parts(name, kind, width, height, inputs, hidden, outputs)?;
    net.set_trained_secs(trained_secs);
    net.set_region(region);
    net.set_focus(Some(focus));

    Ok(net)
}

/// Row by row access to a record that remembers where it is, for error reporting.
struct Rows<R: Read> {
    records: StringRecordsIntoIter<R>,
    line: u64,
}

impl<R: Read> Rows<R> {
    fn new(reader: R) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();

        Self { records, line: 0 }
    }

    fn malformed(&self, reason: impl Into<String>) -> NetErr {
        NetErr::Malformed {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn next_row(&mut self) -> Result<StringRecord> {
        let Some(row) = self.records.next() else {
            self.line += 1;
            return Err(self.malformed("the record ends early"));
        };

        let row = row?;
        self.line = row.position().map_or(self.line + 1, |p| p.line());
        Ok(row)
    }

    fn field<T: FromStr>(&self, row: &StringRecord, i: usize, what: &str) -> Result<T> {
        let raw = row
            .get(i)
            .ok_or_else(|| self.malformed(format!("missing {what}")))?;

        raw.trim()
            .parse()
            .map_err(|_| self.malformed(format!("invalid {what} '{raw}'")))
    }

    fn count(&mut self, what: &str) -> Result<usize> {
        let row = self.next_row()?;
        self.field(&row, 0, what)
    }

    fn finite(&self, row: &StringRecord, i: usize, what: &str) -> Result<f64> {
        let v: f64 = self.field(row, i, what)?;
        if v.is_finite() {
            Ok(v)
        } else {
            Err(self.malformed(format!("{what} is not finite")))
        }
    }

    fn floats(&mut self) -> Result<Vec<f64>> {
        let row = self.next_row()?;
        (0..row.len())
            .map(|i| self.finite(&row, i, "weight"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural_net::{NetworkBuilder, NetworkSpec};

    fn sample() -> Network {
        let spec = NetworkSpec {
            name: "codec".into(),
            kind: NetKind::Reinforcement,
            input_width: 3,
            input_height: 2,
            hidden_layers: 2,
            hidden_units: 3,
            outputs: vec![KeyIdentifier::Up, KeyIdentifier::Down],
            region: Some(Rect::new(-40, 12, 300, 200)),
            focus: Some(Rect::new(10, 30, 60, 40)),
        };

        let mut net = NetworkBuilder::new().seed(21).build(&spec).unwrap();
        net.set_trained_secs(98_765);
        net
    }

    fn encoded(net: &Network) -> String {
        let mut buf = Vec::new();
        encode(net, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn layout_follows_record_format() {
        let text = encoded(&sample());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "3,2,reinforcement,98765,300,200,-40,12,60,40,10,30");
        assert_eq!(lines[1], "6");
        assert_eq!(lines[2].split(',').count(), 3);
        assert_eq!(lines[8], "2");
        assert_eq!(lines[9], "3");
        assert!(lines[lines.len() - 2].starts_with("VK_UP,"));
        assert!(lines[lines.len() - 1].starts_with("VK_DOWN,"));
    }

    #[test]
    fn decodes_what_it_encodes() {
        let net = sample();
        let back = decode("codec", encoded(&net).as_bytes()).unwrap();
        assert_eq!(back, net);
    }

    #[test]
    fn zero_focus_decodes_to_none() {
        let mut net = sample();
        net.set_focus(None);
        let back = decode("codec", encoded(&net).as_bytes()).unwrap();
        assert_eq!(back.focus(), None);
    }

    #[test]
    fn truncated_record_fails() {
        let text = encoded(&sample());
        let cut: String = text.lines().take(12).collect::<Vec<_>>().join("\n");

        let err = decode("codec", cut.as_bytes()).unwrap_err();
        assert!(matches!(err, NetErr::Malformed { .. }), "{err}");
    }

    #[test]
    fn bad_number_reports_its_line() {
        let text = encoded(&sample()).replacen("\n6\n", "\nsix\n", 1);

        match decode("codec", text.as_bytes()).unwrap_err() {
            NetErr::Malformed { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("input unit count"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn huge_unit_counts_fail_without_allocating() {
        let text = "1,1,supervised,0,1,1,0,0,0,0,0,0\n1000000000000000000\n";
        let err = decode("codec", text.as_bytes()).unwrap_err();
        assert!(matches!(err, NetErr::Malformed { .. }), "{err}");
    }

    #[test]
    fn non_finite_biases_fail() {
        let net = sample();
        let bias = net.outputs()[0].bias().to_string();
        let text = encoded(&net).replace(&format!("VK_UP,{bias}"), "VK_UP,NaN");
        assert!(matches!(
            decode("codec", text.as_bytes()),
            Err(NetErr::Malformed { .. })
        ));

        let hidden = net.hidden_layers()[0].units()[0].bias().to_string();
        let mut lines: Vec<String> = encoded(&net).lines().map(String::from).collect();
        let at = lines.iter().position(|l| *l == hidden).unwrap();
        lines[at] = "inf".into();
        assert!(matches!(
            decode("codec", lines.join("\n").as_bytes()),
            Err(NetErr::Malformed { .. })
        ));
    }

    #[test]
    fn unknown_label_fails() {
        let text = encoded(&sample()).replace("VK_DOWN", "VK_WHATEVER");
        assert!(decode("codec", text.as_bytes()).is_err());
    }

    #[test]
    fn inconsistent_weight_counts_fail() {
        // Input units must carry one weight per first layer unit.
        let text = encoded(&sample());
        let mut lines: Vec<String> = text.lines().map(String::from).collect();
        lines[2] = "0.1,0.2".into();

        let err = decode("codec", lines.join("\n").as_bytes()).unwrap_err();
        assert!(matches!(err, NetErr::InvalidGeometry(_)));
    }
}
