//! Text tables with one file per irreducible state and channel family.
//!
//! ```text
//! <root>/ph/plus/<state>    weight first second
//! <root>/ph/minus/<state>   weight first second
//! <root>/phe/<state>        weight initial final
//! <root>/el/<state>         sign weight D|I phonon final
//! ```
//!
//! Electron absorption (`+`) and emission (`-`) records share a file. Blank lines and
//! lines starting with `#` are ignored.

use super::{Channel, PhononRef, ScatteringTableError, ScatteringTables, TransitionRecord};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Clone, Debug)]
pub struct DiskTables {
    root: PathBuf,
}

impl DiskTables {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, channel: Channel, state: usize) -> PathBuf {
        let directory = match channel {
            Channel::PhononPlus => self.root.join("ph").join("plus"),
            Channel::PhononMinus => self.root.join("ph").join("minus"),
            Channel::PhononElectron => self.root.join("phe"),
            Channel::ElectronPlus | Channel::ElectronMinus => self.root.join("el"),
        };
        directory.join(state.to_string())
    }

    /// Writes the records of `state` in `channel`, replacing any previously stored for
    /// the same channel
    pub fn store(
        &self,
        channel: Channel,
        state: usize,
        records: &[TransitionRecord],
    ) -> Result<(), ScatteringTableError> {
        let path = self.path(channel, state);
        let io_error = |source: std::io::Error| ScatteringTableError::Io {
            path: path.clone(),
            source,
        };

        let mut lines = match sign(channel) {
            Some(own) => read_optional(&path)?
                .lines()
                .filter(|line| !line.trim_start().starts_with(own))
                .map(String::from)
                .collect::<Vec<_>>(),
            None => Vec::new(),
        };
        for record in records {
            lines.push(format_record(channel, record)?);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(&path, contents).map_err(io_error)
    }
}

impl ScatteringTables for DiskTables {
    fn fetch(
        &self,
        channel: Channel,
        state: usize,
    ) -> Result<Vec<TransitionRecord>, ScatteringTableError> {
        let path = self.path(channel, state);
        let contents = fs::read_to_string(&path).map_err(|source| ScatteringTableError::Io {
            path: path.clone(),
            source,
        })?;

        let mut records = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let malformed = |reason: &str| ScatteringTableError::Malformed {
                path: path.clone(),
                line: number + 1,
                reason: reason.into(),
            };

            if let Some(own) = sign(channel) {
                let token = tokens.next().ok_or_else(|| malformed("missing sign"))?;
                match token {
                    "+" | "-" if token.starts_with(own) => {}
                    "+" | "-" => continue,
                    _ => return Err(malformed("the sign must be `+` or `-`")),
                }
            }

            let weight: f64 = parse(tokens.next(), "weight").map_err(|e| malformed(&e))?;
            let record = match channel {
                Channel::ElectronPlus | Channel::ElectronMinus => {
                    let kind = tokens
                        .next()
                        .ok_or_else(|| malformed("missing phonon kind"))?;
                    let phonon: usize =
                        parse(tokens.next(), "phonon state").map_err(|e| malformed(&e))?;
                    let phonon = match kind {
                        "D" => PhononRef::Direct(phonon),
                        "I" => PhononRef::Interpolated(phonon),
                        _ => return Err(malformed("the phonon kind must be `D` or `I`")),
                    };
                    let second = parse(tokens.next(), "final state").map_err(|e| malformed(&e))?;
                    TransitionRecord::via_phonon(weight, phonon, second)
                }
                _ => {
                    let first = parse(tokens.next(), "first state").map_err(|e| malformed(&e))?;
                    let second =
                        parse(tokens.next(), "second state").map_err(|e| malformed(&e))?;
                    TransitionRecord::between(weight, first, second)
                }
            };
            if tokens.next().is_some() {
                return Err(malformed("trailing fields"));
            }
            records.push(record);
        }
        Ok(records)
    }
}

fn sign(channel: Channel) -> Option<char> {
    match channel {
        Channel::ElectronPlus => Some('+'),
        Channel::ElectronMinus => Some('-'),
        _ => None,
    }
}

fn parse<T: FromStr>(token: Option<&str>, what: &str) -> Result<T, String> {
    let token = token.ok_or_else(|| format!("missing {what}"))?;
    token
        .parse()
        .map_err(|_| format!("cannot parse {what} from `{token}`"))
}

fn read_optional(path: &Path) -> Result<String, ScatteringTableError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ScatteringTableError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn format_record(
    channel: Channel,
    record: &TransitionRecord,
) -> Result<String, ScatteringTableError> {
    Ok(match sign(channel) {
        Some(sign) => {
            let (kind, phonon) = match record.first_phonon(channel)? {
                PhononRef::Direct(phonon) => ('D', phonon),
                PhononRef::Interpolated(phonon) => ('I', phonon),
            };
            format!("{sign} {} {kind} {phonon} {}", record.weight, record.second)
        }
        None => format!(
            "{} {} {}",
            record.weight,
            record.first_state(channel)?,
            record.second
        ),
    })
}

#[cfg(test)]
mod test {
    use super::DiskTables;
    use crate::scattering::{
        Channel, PhononRef, ScatteringTableError, ScatteringTables, TransitionRecord,
    };
    use std::fs;

    #[test]
    fn stored_records_are_fetched_back() {
        let dir = tempfile::tempdir().unwrap();
        let tables = DiskTables::new(dir.path());
        let records = vec![
            TransitionRecord::between(0.125, 4, 7),
            TransitionRecord::between(3.5e-3, 1, 2),
        ];
        tables.store(Channel::PhononPlus, 5, &records).unwrap();
        assert_eq!(tables.fetch(Channel::PhononPlus, 5).unwrap(), records);
    }

    #[test]
    fn electron_signs_share_a_file_and_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let tables = DiskTables::new(dir.path());
        let plus = vec![TransitionRecord::via_phonon(1.5, PhononRef::Direct(3), 8)];
        let minus = vec![
            TransitionRecord::via_phonon(2.5, PhononRef::Interpolated(11), 9),
            TransitionRecord::via_phonon(0.5, PhononRef::Direct(0), 2),
        ];
        tables.store(Channel::ElectronPlus, 0, &plus).unwrap();
        tables.store(Channel::ElectronMinus, 0, &minus).unwrap();
        // Storing again replaces the records of that sign only
        tables.store(Channel::ElectronPlus, 0, &plus).unwrap();

        assert_eq!(tables.fetch(Channel::ElectronPlus, 0).unwrap(), plus);
        assert_eq!(tables.fetch(Channel::ElectronMinus, 0).unwrap(), minus);
    }

    #[test]
    fn hand_written_file_with_comments_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phe");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("2"), "# weight initial final\n\n0.5 10 12\n").unwrap();

        let tables = DiskTables::new(dir.path());
        let records = tables.fetch(Channel::PhononElectron, 2).unwrap();
        assert_eq!(records, vec![TransitionRecord::between(0.5, 10, 12)]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let tables = DiskTables::new(dir.path());
        assert!(matches!(
            tables.fetch(Channel::PhononMinus, 0),
            Err(ScatteringTableError::Io { .. })
        ));
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ph").join("minus");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("0"), "1.0 2 3\n1.0 two 3\n").unwrap();

        let tables = DiskTables::new(dir.path());
        match tables.fetch(Channel::PhononMinus, 0) {
            Err(ScatteringTableError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a malformed record, got {other:?}"),
        }
    }
}
