use std::io::Write;

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::{
    domain::{Database, HostType},
    render::{HostSelection, RenderError, SuiteSelection},
};

/// Serializes the selected hosts as a sequence of `host` elements.
///
/// Returns an empty string when nothing is selected.
pub(crate) fn write_hosts(
    database: &Database,
    hosts: &[HostSelection<'_>],
) -> Result<String, RenderError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    for host in hosts {
        write_host(&mut writer, database, host)?;
    }

    let xml = String::from_utf8(writer.into_inner()).map_err(|e| RenderError::Xml(e.to_string()))?;
    Ok(xml.trim().to_string())
}

fn write_host<W: Write>(
    writer: &mut Writer<W>,
    database: &Database,
    host: &HostSelection<'_>,
) -> Result<(), RenderError> {
    let mut start = BytesStart::new("host");
    start.push_attribute(("name", host.host_type.name()));
    if host.host_type.ignore_panic() {
        start.push_attribute(("ignore_panic", "true"));
    }
    emit(writer, Event::Start(start))?;

    for recipeset in &host.recipesets {
        let mut start = BytesStart::new("recipeset");
        start.push_attribute(("name", recipeset.name()));
        emit(writer, Event::Start(start))?;

        for member in recipeset.members() {
            let mut element = BytesStart::new("member");
            element.push_attribute(("name", member.as_str()));
            // Members need not be declared host types.
            if database.host_type(member).is_some_and(HostType::ignore_panic) {
                element.push_attribute(("ignore_panic", "true"));
            }
            emit(writer, Event::Empty(element))?;
        }

        emit(writer, Event::End(BytesEnd::new("recipeset")))?;
    }

    for suite in &host.suites {
        write_suite(writer, suite)?;
    }

    emit(writer, Event::End(BytesEnd::new("host")))
}

fn write_suite<W: Write>(
    writer: &mut Writer<W>,
    selection: &SuiteSelection<'_>,
) -> Result<(), RenderError> {
    let mut start = BytesStart::new("suite");
    start.push_attribute(("description", selection.suite.description()));
    emit(writer, Event::Start(start))?;

    for maintainer in selection.suite.maintainers() {
        emit(writer, Event::Start(BytesStart::new("maintainer")))?;
        emit(writer, Event::Text(BytesText::new(maintainer)))?;
        emit(writer, Event::End(BytesEnd::new("maintainer")))?;
    }

    for case in &selection.cases {
        let duration = case.max_duration_seconds().to_string();
        let mut element = BytesStart::new("case");
        element.push_attribute(("name", case.name()));
        element.push_attribute(("max_duration_seconds", duration.as_str()));
        if case.is_waived() {
            element.push_attribute(("waived", "true"));
        }
        emit(writer, Event::Empty(element))?;
    }

    emit(writer, Event::End(BytesEnd::new("suite")))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|e| RenderError::Xml(e.to_string()))
}
