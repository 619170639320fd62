use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::operands::{expr_prefix, split_commas};
use super::{Assembler, Mode, Pass};
use crate::error::{LineError, SyntaxError};
use crate::lexer::{Punct, Tok, Token};
use crate::listing::{InstructionRecord, RecordKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Org,
    Orgf,
    Orgh,
    Fit,
    Res,
    Byte,
    Word,
    Long,
    File,
    AlignW,
    AlignL,
}

impl Directive {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_uppercase().as_str() {
            "ORG" => Directive::Org,
            "ORGF" => Directive::Orgf,
            "ORGH" => Directive::Orgh,
            "FIT" => Directive::Fit,
            "RES" => Directive::Res,
            "BYTE" => Directive::Byte,
            "WORD" => Directive::Word,
            "LONG" => Directive::Long,
            "FILE" => Directive::File,
            "ALIGNW" => Directive::AlignW,
            "ALIGNL" => Directive::AlignL,
            _ => return None,
        })
    }
}

impl Assembler<'_> {
    pub(super) fn directive(&mut self, d: Directive, toks: &[Token], rec: &mut InstructionRecord) -> Result<(), LineError> {
        rec.kind = RecordKind::Directive;
        match d {
            Directive::Org => {
                let addr = self.optional_value(toks)?.unwrap_or(0);
                self.cursor.org(addr)?;
                self.moved(rec);
                debug!(addr, pass = ?self.pass, "ORG");
            }
            Directive::Orgh => {
                let addr = self.optional_value(toks)?;
                self.cursor.orgh(addr)?;
                self.moved(rec);
                debug!(hub = self.cursor.hub(), pass = ?self.pass, "ORGH");
            }
            Directive::Orgf => {
                if self.cursor.mode() == Mode::Hub {
                    return Err(SyntaxError::Expected { expected: "cog mode for ORGF", found: "ORGH".into() }.into());
                }
                let target = self.eval_toks(toks)?.value;
                let longs = self.cursor.orgf_fill(target)?;
                self.cursor.room(longs as u64 * 4)?;
                rec.kind = RecordKind::Data;
                self.emit(rec, &[], &vec![0; longs as usize * 4]);
            }
            Directive::Fit => {
                let limit = self.optional_value(toks)?;
                if self.pass == Pass::Second {
                    self.cursor.fit(limit)?;
                }
            }
            Directive::Res => {
                let longs = self.optional_value(toks)?.unwrap_or(1);
                if let Err(e) = self.cursor.reserve(longs) {
                    self.note(e);
                }
            }
            Directive::Byte => self.data(1, toks, rec)?,
            Directive::Word => self.data(2, toks, rec)?,
            Directive::Long => self.data(4, toks, rec)?,
            Directive::File => self.file(toks, rec)?,
            Directive::AlignW | Directive::AlignL => {
                let multiple = if d == Directive::AlignW { 2 } else { 4 };
                let pad = self.cursor.padding(multiple);
                self.emit(rec, &[], &vec![0; pad as usize]);
            }
        }
        Ok(())
    }

    fn optional_value(&mut self, toks: &[Token]) -> Result<Option<u32>, LineError> {
        if toks.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.eval_toks(toks)?.value))
    }

    /// Origin directives describe the position after the line.
    fn moved(&self, rec: &mut InstructionRecord) {
        rec.region = self.cursor.region();
        rec.pc = self.cursor.pc();
        rec.hub = self.cursor.hub();
    }

    /// `BYTE`/`WORD`/`LONG` items: expressions, `expr[count]` repeats and
    /// strings, one unit per character. A failing item still occupies its
    /// space so later addresses do not move between passes. A repeat that
    /// runs past the region fails the line and emits nothing.
    fn data(&mut self, width: usize, toks: &[Token], rec: &mut InstructionRecord) -> Result<(), LineError> {
        rec.kind = RecordKind::Data;
        let mut bytes = Vec::new();
        for item in split_commas(toks) {
            match item {
                [] => self.note(SyntaxError::Expected { expected: "data item", found: ",".into() }),
                [Token { tok: Tok::Str(s), .. }] => {
                    for &b in s {
                        bytes.extend_from_slice(&(b as u32).to_le_bytes()[..width]);
                    }
                }
                _ => {
                    let (value, count) = match self.data_item(item) {
                        Ok(v) => v,
                        Err(e) => {
                            self.note(e);
                            (0, 1)
                        }
                    };
                    self.cursor.room(bytes.len() as u64 + count as u64 * width as u64)?;
                    for _ in 0..count {
                        bytes.extend_from_slice(&value.to_le_bytes()[..width]);
                    }
                }
            }
        }
        self.emit(rec, &[], &bytes);
        Ok(())
    }

    fn data_item(&mut self, item: &[Token]) -> Result<(u32, u32), LineError> {
        let (e, rest) = expr_prefix(item)?;
        let value = self.eval(&e)?.value;
        let count = match rest {
            [] => 1,
            [open, inner @ .., close] if open.is(Punct::LBracket) && close.is(Punct::RBracket) => {
                self.eval_toks(inner)?.value
            }
            _ => {
                let extra = self.snippet(rest);
                self.note(SyntaxError::ExtraParameters(extra));
                1
            }
        };
        Ok((value, count))
    }

    fn file(&mut self, toks: &[Token], rec: &mut InstructionRecord) -> Result<(), LineError> {
        rec.kind = RecordKind::Data;
        let name = match toks {
            [Token { tok: Tok::Str(s), .. }] => String::from_utf8_lossy(s).into_owned(),
            [t, ..] => return Err(SyntaxError::Expected { expected: "file name", found: t.text() }.into()),
            [] => return Err(SyntaxError::Expected { expected: "file name", found: "end of line".into() }.into()),
        };
        match self.load(&name) {
            Some(bytes) => {
                self.emit(rec, &[], &bytes);
                Ok(())
            }
            None if self.options.error_on_missing_file => Err(LineError::Io { path: name }),
            None => {
                if self.pass == Pass::Second {
                    warn!(file = %name, line = self.line, "FILE not found, leaving it empty");
                }
                self.warn(LineError::Io { path: name });
                Ok(())
            }
        }
    }

    /// Reads a FILE operand once per run, next to the source first.
    fn load(&mut self, name: &str) -> Option<Vec<u8>> {
        if let Some(cached) = self.files.get(name) {
            return cached.clone();
        }
        let candidates = [
            self.base_dir.as_ref().map(|d| d.join(name)),
            self.options.include_dir.as_ref().map(|d| d.join(name)),
            Some(PathBuf::from(name)),
        ];
        let found = candidates.into_iter().flatten().find_map(|p| fs::read(p).ok());
        debug!(file = name, bytes = found.as_ref().map(Vec::len), "FILE");
        self.files.insert(name.to_string(), found.clone());
        found
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::{assemble, Assembly, Source};
    use crate::error::{BoundaryError, LineError, Severity};
    use crate::isa::p2::Region;
    use crate::options::AsmOptions;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> Assembly {
        assemble(Source::Text(src.to_string()), &AsmOptions::default()).unwrap()
    }

    #[test]
    fn data_items_repeat_and_expand_strings() {
        let a = run("  byte \"ab\", 1[3]\n  word $1234\n");
        assert_eq!(a.record(1).unwrap().data, vec![b'a', b'b', 1, 1, 1]);
        assert_eq!(a.record(2).unwrap().data, vec![0x34, 0x12]);
        assert_eq!(a.image.bytes(), &[b'a', b'b', 1, 1, 1, 0x34, 0x12]);
    }

    #[test]
    fn orgh_switches_to_hub_addresses() {
        let a = run("  orgh $400\nhere  nop\n");
        let r = a.record(2).unwrap();
        assert_eq!((r.region, r.pc, r.hub), (Region::Hub, 0x400, 0x400));
        assert_eq!(a.symbol("here").map(|s| s.value), Some(0x400));
    }

    #[test]
    fn orgf_pads_with_zero_longs() {
        let a = run("  nop\n  orgf 4\n  long 7\n");
        assert_eq!(a.record(2).unwrap().data.len(), 12);
        assert_eq!(a.record(3).unwrap().pc, 4);
    }

    #[test]
    fn orgf_past_the_cog_limit_emits_nothing() {
        let a = run("  nop\n  orgf $FFFFFFF\n  long 7\n");
        let r = a.record(2).unwrap();
        assert_eq!(
            r.diagnostics[0].error,
            LineError::Boundary(BoundaryError::AddressLimit { region: Region::Cog, addr: 1, limit: 0x200 })
        );
        assert!(r.data.is_empty());
        assert_eq!(a.record(3).unwrap().pc, 1);
    }

    #[test]
    fn huge_repeat_counts_are_rejected() {
        let a = run("  long 0[$FFFFFFF]\n  long 5\n");
        let r = a.record(1).unwrap();
        assert_eq!(
            r.diagnostics[0].error,
            LineError::Boundary(BoundaryError::AddressLimit { region: Region::Cog, addr: 0, limit: 0x200 })
        );
        assert!(r.data.is_empty());
        assert_eq!(a.record(2).unwrap().data, vec![5, 0, 0, 0]);
        assert_eq!(a.image.len(), 4);

        let hub = run("  orgh\n  byte 1[$FFFFF]\n");
        assert_eq!(
            hub.record(2).unwrap().diagnostics[0].error,
            LineError::Boundary(BoundaryError::AddressLimit { region: Region::Hub, addr: 0x400, limit: 0x10_0000 })
        );
    }

    #[test]
    fn res_reserves_cog_space_only() {
        let a = run("  res 4\nx long 1\n");
        let r = a.record(2).unwrap();
        assert_eq!((r.pc, r.hub), (4, 0));
    }

    #[test]
    fn fit_reports_overflow() {
        let a = run("  org $1f0\n  long 0\n  fit\n");
        assert_eq!(
            a.record(3).unwrap().diagnostics[0].error,
            LineError::Boundary(BoundaryError::Fit { limit: 0x1f0, addr: 0x1f1 })
        );
    }

    #[test]
    fn missing_file_can_be_a_warning() {
        let opts = AsmOptions { error_on_missing_file: false, ..AsmOptions::default() };
        let a = assemble(Source::Text("  file \"nope.bin\"\n".into()), &opts).unwrap();
        let d = &a.record(1).unwrap().diagnostics[0];
        assert_eq!(d.severity, Severity::Warning);
        assert!(!a.has_errors());
        let strict = run("  file \"nope.bin\"\n");
        assert!(strict.has_errors());
    }

    #[test]
    fn alignment_pads_to_the_boundary() {
        let a = run("  byte 1\n  alignl\n  long 2\n");
        assert_eq!(a.record(2).unwrap().data, vec![0, 0, 0]);
        assert_eq!(a.record(3).unwrap().hub, 4);
    }
}
