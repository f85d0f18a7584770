use super::*;
use dialograph_core::{
    ErrorKind, InMemoryPort, LevenshteinVector, Name, ScenarioId, ScenarioInfo, SourceText,
    StateAttrs, StateId, DEFAULT_REQUIRED_STATES,
};

fn name(s: &str) -> Name {
    Name::new(s).unwrap()
}

/// Bootstrapped scenario with a help branch, a removed state leaving an id
/// gap, and text that needs escaping.
fn sample() -> Scenario {
    let info = ScenarioInfo::new(ScenarioId::new(7), "Погода & <новости>")
        .with_description("Навык \"о погоде\"");
    let mut s = Scenario::bootstrap(info, InMemoryPort::new(), DEFAULT_REQUIRED_STATES).unwrap();
    let start = s.find_state_by_name("Старт").unwrap().unwrap();

    s.add_vector(
        LevenshteinVector::with_synonyms(name("погода"), ["какая погода", "погода сегодня"])
            .unwrap()
            .into(),
    )
    .unwrap();
    s.add_vector(LevenshteinVector::new(name("пусто")).into()).unwrap();

    let scratch = s
        .restore_state(StateAttrs::named(name("черновик")), SourceText::default(), false)
        .unwrap();
    s.remove_state(scratch.id).unwrap();

    let weather = s
        .create_step_to_new_state(
            start.id,
            StateAttrs::named(name("Погода")).with_description("прогноз"),
            SourceText::new("Сегодня солнечно,\nвечером дождь < 5 мм"),
            &name("погода"),
        )
        .unwrap();
    s.create_step_between(weather.to, start.id, &name("Помощь"))
        .unwrap();
    s
}

/// `doc` with every state id translated through `remap`.
fn remapped(mut doc: ScenarioDocument, remap: &IdRemap) -> ScenarioDocument {
    let map = |id: &mut StateId| *id = remap[&*id];
    doc.states.iter_mut().for_each(|s| map(&mut s.id));
    doc.entries.iter_mut().for_each(|e| map(&mut e.state));
    for t in &mut doc.transitions {
        map(&mut t.from);
        t.steps.iter_mut().for_each(|s| map(&mut s.to));
    }
    doc
}

#[test]
fn test_export_then_read_preserves_document() {
    let s = sample();
    let xml = export_scenario(&s).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<Сценарий"));
    assert_eq!(
        read_document(&xml).unwrap(),
        ScenarioDocument::from_scenario(&s).unwrap()
    );
}

#[test]
fn test_import_yields_isomorphic_scenario() {
    let s = sample();
    let original = ScenarioDocument::from_scenario(&s).unwrap();
    let xml = export_scenario(&s).unwrap();

    let imported = import_scenario(&xml, InMemoryPort::new()).unwrap();
    assert_eq!(imported.id_remap.len(), original.states.len());

    let restored = ScenarioDocument::from_scenario(&imported.scenario).unwrap();
    assert_eq!(remapped(original, &imported.id_remap), restored);

    // ids are reassigned densely by the fresh port
    let ids: Vec<u64> = imported.id_remap.values().map(|id| id.raw()).collect();
    assert_eq!(ids, (1..=ids.len() as u64).collect::<Vec<_>>());
}

#[test]
fn test_required_flags_survive_import() {
    let xml = export_scenario(&sample()).unwrap();
    let imported = import_scenario(&xml, InMemoryPort::new()).unwrap();
    let mut s = imported.scenario;

    let start = s.find_state_by_name("Старт").unwrap().unwrap();
    assert!(start.required);
    assert_eq!(s.remove_state(start.id).unwrap_err().kind(), ErrorKind::Forbidden);

    let weather = s.find_state_by_name("Погода").unwrap().unwrap();
    assert!(!weather.required);
    assert_eq!(weather.description.as_str(), "прогноз");
}

#[test]
fn test_minimal_document_imports() {
    let xml = r#"<Сценарий название="мини">
        <Управляющие_воздействия>
            <Вектор название="Старт"><Синоним>начать</Синоним></Вектор>
        </Управляющие_воздействия>
        <Состояния>
            <Состояние ид="10" название="Старт" обязательное="true">
                <Содержание>Привет</Содержание>
            </Состояние>
        </Состояния>
        <Входы><Вход состояние="10" вектор="Старт"/></Входы>
        <Заметки>ignored</Заметки>
    </Сценарий>"#;
    let imported = import_scenario(xml, InMemoryPort::new()).unwrap();
    let new_id = imported.id_remap[&StateId::new(10)];
    let state = imported.scenario.state(new_id).unwrap();
    assert!(state.required);
    assert_eq!(state.output.as_str(), "Привет");
    assert!(imported.scenario.is_entry(new_id).unwrap());
    assert_eq!(imported.scenario.info().name.as_str(), "мини");
}

#[test]
fn test_dangling_state_reference_is_rejected() {
    let xml = r#"<Сценарий>
        <Управляющие_воздействия><Вектор название="а"/></Управляющие_воздействия>
        <Состояния><Состояние ид="1" название="А"/></Состояния>
        <Переходы><Переход из="1"><Шаг в="2" вектор="а"/></Переход></Переходы>
    </Сценарий>"#;
    let err = import_scenario(xml, InMemoryPort::new()).err().unwrap();
    assert!(matches!(err, DocumentError::UnknownState(id) if id == StateId::new(2)));
}

#[test]
fn test_step_through_unknown_vector_is_a_scenario_error() {
    let xml = r#"<Сценарий>
        <Состояния>
            <Состояние ид="1" название="А"/>
            <Состояние ид="2" название="Б"/>
        </Состояния>
        <Переходы><Переход из="1"><Шаг в="2" вектор="нет такого"/></Переход></Переходы>
    </Сценарий>"#;
    let err = import_scenario(xml, InMemoryPort::new()).err().unwrap();
    match err {
        DocumentError::Scenario(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_documents_are_rejected() {
    for xml in [
        "",
        "<Другое/>",
        "<Сценарий><Состояния>",
        r#"<Сценарий><Состояния><Состояние название="без ид"/></Состояния></Сценарий>"#,
        r#"<Сценарий><Состояния><Состояние ид="1" название="А" обязательное="может"/></Состояния></Сценарий>"#,
        r#"<Сценарий><Управляющие_воздействия><Вектор название="x" тип="regex"/></Управляющие_воздействия></Сценарий>"#,
    ] {
        assert!(read_document(xml).is_err(), "accepted: {xml:?}");
    }
}
