// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use nom::bytes::complete::{tag, take_till1, take_while, take_while1};
use nom::character::complete::{char, digit1};
use nom::combinator::map_res;
use nom::{sequence::delimited, IResult};

/// Search keys, ex. `title`, `email` or `zipcode`
pub(crate) fn parse_ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// Single quoted text, titles may carry commas and parentheses
pub(crate) fn parse_string(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till1(|c: char| c == '\''), char('\''))(input)
}

/// Ids and scores, anything that doesn't fit in an `i32` is rejected
pub(crate) fn parse_number(input: &str) -> IResult<&str, i32> {
    map_res(digit1, |s: &str| s.parse::<i32>())(input)
}

pub(crate) fn parse_separator(input: &str) -> IResult<&str, &str> {
    delimited(
        take_while(|c: char| c == ' '),
        tag(","),
        take_while(|c: char| c == ' '),
    )(input)
}
