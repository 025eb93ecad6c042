// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

mod basics;

use basics::{parse_ident, parse_number, parse_separator, parse_string};
use controller::{Score, SearchBy};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, value};
use nom::sequence::{delimited, preceded, separated_pair, tuple};
use nom::IResult;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Database {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    Connect(Database),
    QueryUser(SearchBy),
    QueryMovie(SearchBy),
    QueryRatings(SearchBy),
    QueryRaters(SearchBy),
    Similarity(SearchBy, SearchBy),
    Predict(SearchBy, SearchBy),
    Neighbors(SearchBy, SearchBy),
    Rate(SearchBy, SearchBy, Score),
    Unrate(SearchBy, SearchBy),
    InsertUser,
    InsertMovie,
}

fn args<'a, O, F>(parser: F) -> impl Fn(&'a str) -> IResult<&'a str, O>
where
    F: Fn(&'a str) -> IResult<&'a str, O>,
{
    delimited(char('('), parser, char(')'))
}

fn parse_database(input: &str) -> IResult<&str, Database> {
    alt((
        value(Database::Postgres, tag("postgres")),
        value(Database::Memory, tag("memory")),
    ))(input)
}

// id(42), title('Heat'), email('jessica@example.com'), zipcode('85711')
fn parse_searchby(input: &str) -> IResult<&str, SearchBy> {
    alt((
        map(preceded(tag("id"), args(parse_number)), |id| {
            SearchBy::id(&id.to_string())
        }),
        map(tuple((parse_ident, args(parse_string))), |(key, val)| match key {
            "name" | "title" | "email" => SearchBy::name(val),
            key => SearchBy::custom(key, val),
        }),
    ))(input)
}

fn parse_pair(input: &str) -> IResult<&str, (SearchBy, SearchBy)> {
    separated_pair(parse_searchby, parse_separator, parse_searchby)(input)
}

fn parse_query(input: &str) -> IResult<&str, Statement> {
    alt((
        map(preceded(tag("query_user"), args(parse_searchby)), Statement::QueryUser),
        map(preceded(tag("query_movie"), args(parse_searchby)), Statement::QueryMovie),
        map(preceded(tag("query_ratings"), args(parse_searchby)), Statement::QueryRatings),
        map(preceded(tag("query_raters"), args(parse_searchby)), Statement::QueryRaters),
    ))(input)
}

fn parse_engine(input: &str) -> IResult<&str, Statement> {
    alt((
        map(preceded(tag("similarity"), args(parse_pair)), |(a, b)| {
            Statement::Similarity(a, b)
        }),
        map(preceded(tag("predict"), args(parse_pair)), |(user, movie)| {
            Statement::Predict(user, movie)
        }),
        map(preceded(tag("neighbors"), args(parse_pair)), |(user, movie)| {
            Statement::Neighbors(user, movie)
        }),
    ))(input)
}

fn parse_update(input: &str) -> IResult<&str, Statement> {
    let rate = tuple((
        parse_searchby,
        parse_separator,
        parse_searchby,
        parse_separator,
        parse_number,
    ));

    alt((
        map(preceded(tag("rate"), args(rate)), |(user, _, movie, _, score)| {
            Statement::Rate(user, movie, score)
        }),
        map(preceded(tag("unrate"), args(parse_pair)), |(user, movie)| {
            Statement::Unrate(user, movie)
        }),
        value(Statement::InsertUser, tag("insert_user")),
        value(Statement::InsertMovie, tag("insert_movie")),
    ))(input)
}

fn parse_statement(input: &str) -> IResult<&str, Statement> {
    alt((
        map(preceded(tag("connect"), args(parse_database)), Statement::Connect),
        parse_query,
        parse_engine,
        parse_update,
    ))(input)
}

pub fn parse_line(input: &str) -> Option<Statement> {
    let input = input.trim();
    let (rest, statement) = parse_statement(input).ok()?;

    if rest.is_empty() {
        Some(statement)
    } else {
        None
    }
}
