use crate::util::Util;

use winsys::geometry::Edge;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::Result;

use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gesture {
    pub start: Direction,
    pub borders: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub gesture: Gesture,
    pub timeout: u32,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Binding(Binding),
    Add(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingField(&'static str),
    NoBorders(String),
    UnknownDirection(String),
    InvalidTimeout(String),
}

impl fmt::Display for ParseError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ParseError::MissingField(field) => write!(f, "missing {}", field),
            ParseError::NoBorders(name) => write!(f, "no valid borders in {:?}", name),
            ParseError::UnknownDirection(dir) => write!(f, "unknown direction {:?}", dir),
            ParseError::InvalidTimeout(timeout) => write!(f, "invalid timeout {:?}", timeout),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Crossing {
    edge: Edge,
    direction: Direction,
    time: u32,
}

fn next_token(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();

    if line.is_empty() {
        return None;
    }

    Some(match line.find(char::is_whitespace) {
        Some(end) => (&line[..end], &line[end..]),
        None => (line, ""),
    })
}

fn border_from_char(c: char) -> Option<Edge> {
    match c {
        'T' => Some(Edge::Top),
        'B' => Some(Edge::Bottom),
        'R' => Some(Edge::Right),
        'L' => Some(Edge::Left),
        _ => None,
    }
}

/// Parses one line of a bindings file; blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> Option<std::result::Result<Line, ParseError>> {
    if line.starts_with('#') || line.trim().is_empty() {
        return None;
    }

    let (name, rest) = next_token(line)?;

    if name == "<Add>" {
        let action = rest.trim();

        return Some(if action.is_empty() {
            Err(ParseError::MissingField("action"))
        } else {
            Ok(Line::Add(action.to_owned()))
        });
    }

    Some(parse_binding(name, rest).map(Line::Binding))
}

fn parse_binding(
    name: &str,
    rest: &str,
) -> std::result::Result<Binding, ParseError> {
    let borders: Vec<Edge> = name.chars().filter_map(border_from_char).collect();

    if borders.is_empty() {
        return Err(ParseError::NoBorders(name.to_owned()));
    }

    let (direction, rest) = next_token(rest).ok_or(ParseError::MissingField("direction"))?;
    let start = match direction.chars().next() {
        Some('I') => Direction::In,
        Some('O') => Direction::Out,
        _ => return Err(ParseError::UnknownDirection(direction.to_owned())),
    };

    let (timeout, rest) = next_token(rest).ok_or(ParseError::MissingField("timeout"))?;
    let timeout = match timeout.parse::<i64>() {
        Ok(ms) if ms > 0 && ms <= u32::MAX as i64 => ms as u32,
        _ => return Err(ParseError::InvalidTimeout(timeout.to_owned())),
    };

    let action = rest.trim();
    if action.is_empty() {
        return Err(ParseError::MissingField("action"));
    }

    Ok(Binding {
        name: name.to_owned(),
        gesture: Gesture {
            start,
            borders,
        },
        timeout,
        actions: vec![action.to_owned()],
    })
}

/// Recognizes dwell gestures: sequences of pointer crossings over window edges.
pub struct GestureListener {
    bindings: Vec<Binding>,
    crossings: Vec<Option<Crossing>>,
    next: usize,
}

impl Default for GestureListener {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureListener {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            crossings: Vec::new(),
            next: 0,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let config = fs::read_to_string(path)?;
        Ok(Self::from_config(&config))
    }

    pub fn from_config(config: &str) -> Self {
        let mut listener = Self::new();

        for (lineno, line) in config.lines().enumerate() {
            match parse_line(line) {
                None => {},
                Some(Ok(Line::Binding(binding))) => {
                    if !listener.bind(binding) {
                        warn!("gesture on line {} is already bound", lineno + 1);
                    }
                },
                Some(Ok(Line::Add(action))) => match listener.bindings.last_mut() {
                    Some(binding) => binding.actions.push(action),
                    None => warn!("no gesture to add an action to on line {}", lineno + 1),
                },
                Some(Err(err)) => warn!("skipping gesture on line {}: {}", lineno + 1, err),
            }
        }

        listener
    }

    /// Registers a binding unless an identical gesture is already bound.
    pub fn bind(
        &mut self,
        binding: Binding,
    ) -> bool {
        if self
            .bindings
            .iter()
            .any(|bound| bound.gesture == binding.gesture)
        {
            return false;
        }

        let len = binding.gesture.borders.len();
        if len > self.crossings.len() {
            self.crossings = vec![None; len];
            self.next = 0;
        }

        self.bindings.push(binding);
        true
    }

    #[inline]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The edge of `frame` that a pointer at `pos` crossed, judged by slope from the center.
    pub fn classify(
        frame: Region,
        pos: Pos,
    ) -> Edge {
        let mid_x = frame.pos.x as f64 + (frame.dim.w / 2) as f64;
        let mid_y = frame.pos.y as f64 + (frame.dim.h / 2) as f64;
        let (x, y) = (pos.x as f64, pos.y as f64);

        if (x - mid_x).abs() <= 0.001 {
            return if x < mid_x {
                Edge::Left
            } else {
                Edge::Right
            };
        }

        let slope = (y - mid_y) / (x - mid_x);
        let steep = slope > 1.0 || slope < -1.0;

        match (y < mid_y, steep, slope >= 0.0) {
            (true, true, _) => Edge::Top,
            (true, false, true) => Edge::Left,
            (true, false, false) => Edge::Right,
            (false, true, _) => Edge::Bottom,
            (false, false, true) => Edge::Right,
            (false, false, false) => Edge::Left,
        }
    }

    /// Records a crossing and returns the actions of every gesture it completes.
    pub fn on_crossing(
        &mut self,
        edge: Edge,
        direction: Direction,
        time: u32,
    ) -> Vec<String> {
        let len = self.crossings.len();
        if len == 0 {
            return Vec::with_capacity(0);
        }

        self.crossings[self.next] = Some(Crossing {
            edge,
            direction,
            time,
        });

        let actions = self
            .bindings
            .iter()
            .filter(|binding| self.completes(binding))
            .flat_map(|binding| {
                debug!("recognized gesture {}", binding.name);
                binding.actions.iter().cloned()
            })
            .collect();

        self.next = (self.next + 1) % len;
        actions
    }

    fn completes(
        &self,
        binding: &Binding,
    ) -> bool {
        let len = self.crossings.len();
        let count = binding.gesture.borders.len();
        let start = (self.next + len + 1 - count) % len;

        let crossings: Vec<Crossing> = (0..count)
            .filter_map(|i| self.crossings[(start + i) % len])
            .collect();

        if crossings.len() != count || crossings[0].direction != binding.gesture.start {
            return false;
        }

        crossings
            .iter()
            .zip(binding.gesture.borders.iter())
            .all(|(crossing, &edge)| crossing.edge == edge)
            && crossings
                .windows(2)
                .all(|pair| pair[1].time.wrapping_sub(pair[0].time) <= binding.timeout)
    }

    pub fn run_actions(actions: &[String]) {
        for action in actions {
            debug!("running gesture action {}", action);

            if !Util::spawn_shell(action.as_str()) {
                error!("unable to run gesture action {}", action);
            }
        }
    }
}
