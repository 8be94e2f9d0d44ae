use crate::Axis;

use cgmath::Vector3;
use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::{anychar, char, space0, space1};
use nom::combinator::{all_consuming, map, map_opt, map_res};
use nom::multi::many1;
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')'
}

/// A single float token. Accepts everything `f32::from_str` does, `inf`
/// and `-inf` included.
pub(crate) fn float(i: &str) -> IResult<&str, f32> {
    map_res(take_till1(is_separator), |s: &str| s.parse::<f32>())(i)
}

pub(crate) fn vec3(i: &str) -> IResult<&str, Vector3<f32>> {
    map(
        tuple((float, preceded(space1, float), preceded(space1, float))),
        |(x, y, z)| Vector3::new(x, y, z),
    )(i)
}

/// Axis order letters such as `XYZ`.
pub(crate) fn axis_letters(i: &str) -> IResult<&str, Vec<Axis>> {
    many1(map_opt(anychar, Axis::from_letter))(i)
}

/// `axis` line of a bone: three angles followed by their composition order.
pub(crate) fn angles_and_order(i: &str) -> IResult<&str, (Vector3<f32>, Vec<Axis>)> {
    pair(vec3, preceded(space1, axis_letters))(i)
}

/// `(min max)`
pub(crate) fn limit_pair(i: &str) -> IResult<&str, (f32, f32)> {
    delimited(
        char('('),
        pair(preceded(space0, float), preceded(space0, float)),
        preceded(space0, char(')')),
    )(i)
}

/// `limits (min max)`, the first line of a limits block.
pub(crate) fn limits_line(i: &str) -> IResult<&str, (f32, f32)> {
    preceded(pair(tag("limits"), space0), limit_pair)(i)
}

/// Runs `parser` over the whole of `input`, tolerating surrounding blanks.
pub(crate) fn parse_all<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
    input: &'a str,
) -> Option<O> {
    all_consuming(terminated(parser, space0))(input.trim_start())
        .ok()
        .map(|(_, value)| value)
}

/// Splits a line into its leading keyword and the trimmed remainder.
pub(crate) fn keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim_start()),
        None => (line, ""),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn floats() {
        assert_eq!(parse_all(float, "-1.5e1"), Some(-15.));
        assert_eq!(parse_all(float, "-inf"), Some(f32::NEG_INFINITY));
        assert_eq!(parse_all(float, "1.0.0"), None);
        assert_eq!(parse_all(float, ""), None);
    }

    #[test]
    fn vectors_and_orders() {
        assert_eq!(
            parse_all(vec3, " 0 1   -2 "),
            Some(Vector3::new(0., 1., -2.))
        );
        assert_eq!(parse_all(vec3, "0 1"), None);
        assert_eq!(
            parse_all(angles_and_order, "0 0 20  ZYX"),
            Some((Vector3::new(0., 0., 20.), vec![Axis::Rz, Axis::Ry, Axis::Rx]))
        );
        assert_eq!(parse_all(angles_and_order, "0 0 20 XQZ"), None);
        assert_eq!(parse_all(axis_letters, "XYZ"), Some(vec![Axis::Rx, Axis::Ry, Axis::Rz]));
    }

    #[test]
    fn limits() {
        assert_eq!(parse_all(limits_line, "limits (-160.0 20.0)"), Some((-160., 20.)));
        assert_eq!(parse_all(limits_line, "limits ( -inf inf )"), Some((f32::NEG_INFINITY, f32::INFINITY)));
        assert_eq!(parse_all(limit_pair, "(-70.0 70.0)"), Some((-70., 70.)));
        assert_eq!(parse_all(limit_pair, "limits (-70.0 70.0)"), None);
        assert_eq!(parse_all(limit_pair, "(-70.0)"), None);
        assert_eq!(parse_all(limit_pair, "end"), None);
    }

    #[test]
    fn keywords() {
        assert_eq!(keyword("direction 0 1 0"), ("direction", "0 1 0"));
        assert_eq!(keyword("end"), ("end", ""));
    }
}
