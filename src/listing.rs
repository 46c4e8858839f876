//! Structured parsing of `ls -l` / `ls -ld` output lines.
//!
//! A long listing line looks like
//!
//! ```text
//! drwxrwxrwx 2 www-data www-data 4096 Mar  3 10:12 /var/lock/apache2
//! lrwxrwxrwx 1 root     root       30 Mar  3 10:12 /etc/apache2/mods-enabled/rewrite.load -> ../mods-available/rewrite.load
//! ```
//!
//! The first column carries the file type at offset 0 and nine permission
//! characters at offsets 1..=9 (user, group, others). [`ListingEntry`] exposes
//! those as named fields instead of raw character offsets; the other columns
//! are read when present but never make a line unparseable.

use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    Other(char),
}

impl From<char> for FileType {
    fn from(indicator: char) -> Self {
        match indicator {
            '-' => FileType::Regular,
            'd' => FileType::Directory,
            'l' => FileType::Symlink,
            other => FileType::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    User,
    Group,
    Others,
}

impl Class {
    fn offset(self) -> usize {
        match self {
            Class::User => 0,
            Class::Group => 3,
            Class::Others => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub file_type: FileType,
    /// The nine `rwx` characters following the type indicator
    pub permissions: [char; 9],
    pub links: Option<u64>,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub size: Option<u64>,
    pub path: Option<String>,
    pub link_target: Option<String>,
}

/// Link count, owner, group and size, then at least one timestamp field
const FIELDS_BEFORE_NAME: usize = 5;

impl ListingEntry {
    /// Parses the first line of a long listing.
    ///
    /// Only the mode column is required. The remaining columns vary with
    /// locale, `--time-style` and file type, so each is filled when it can be
    /// read and left `None` otherwise.
    pub fn parse(output: &str) -> Result<Self> {
        let line = output
            .lines()
            .map(str::trim_start)
            .find(|line| !line.is_empty())
            .ok_or_else(|| anyhow!("Empty listing"))?;

        let (mode, rest) = line.split_at(line.find(char::is_whitespace).unwrap_or(line.len()));
        let mode: Vec<char> = mode.chars().collect();
        if mode.len() < 10 {
            return Err(anyhow!("Malformed mode column in listing: {}", line));
        }

        let file_type = FileType::from(mode[0]);
        let mut permissions = ['-'; 9];
        permissions.copy_from_slice(&mode[1..10]);

        let (rest, link_target) = match (file_type, rest.split_once(" -> ")) {
            (FileType::Symlink, Some((name, target))) => (name, Some(target.trim().to_string())),
            _ => (rest, None),
        };

        let fields: Vec<&str> = rest.split_whitespace().collect();
        let text = |index: usize| fields.get(index).map(|field| field.to_string());
        let number = |index: usize| fields.get(index).and_then(|field| field.parse().ok());
        // Names containing spaces are cut to their last word
        let path = if fields.len() > FIELDS_BEFORE_NAME {
            fields.last().map(|name| name.to_string())
        } else {
            None
        };

        Ok(Self {
            file_type,
            permissions,
            links: number(0),
            owner: text(1),
            group: text(2),
            size: number(3),
            path,
            link_target,
        })
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    pub fn can_read(&self, class: Class) -> bool {
        self.permissions[class.offset()] == 'r'
    }

    pub fn can_write(&self, class: Class) -> bool {
        self.permissions[class.offset() + 1] == 'w'
    }

    /// Any of `x`, `s` or `t` in the execute slot
    pub fn can_execute(&self, class: Class) -> bool {
        matches!(self.permissions[class.offset() + 2], 'x' | 's' | 't')
    }

    /// Offset 8 of the raw line
    pub fn others_can_write(&self) -> bool {
        self.can_write(Class::Others)
    }
}
