//! Integration tests for lazy type resolution
//!
//! Each test assembles a small schema with `MemorySchemaIndex`, resolves
//! types through a `TypeRegistry` backed by its own foundation cache, and
//! checks the resulting record graph.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use xsd_featuretypes::dump::TypeSummary;
use xsd_featuretypes::registry::{DefaultPolicy, FoundationTypeCache, RegistryPolicy, TypeRegistry};
use xsd_featuretypes::schema::{
    AttributeUse, ElementDeclaration, ElementParticle, ElementTypeRef, MemorySchemaIndex, Occurs,
    SchemaIndex, TypeDefinition,
};
use xsd_featuretypes::types::{
    find_descriptor, AttributeType, Binding, GeometryKind, PropertyDescriptor, TypeRef, TypeTag, UserValue,
    TYPE_DEFINITION_KEY,
};
use xsd_featuretypes::{Crs, Error, QName, RegistryConfig};

fn registry_for<P: RegistryPolicy>(policy: P, index: MemorySchemaIndex) -> TypeRegistry<P> {
    let mut registry =
        TypeRegistry::with_config(policy, RegistryConfig::default(), &FoundationTypeCache::new())
            .expect("foundation bootstrap");
    registry.add_schema(Arc::new(index));
    registry
}

fn element(name: &str, type_name: QName) -> ElementDeclaration {
    ElementDeclaration::typed(QName::local(name), type_name)
}

fn names(descriptors: &[Arc<PropertyDescriptor>]) -> Vec<String> {
    descriptors.iter().map(|d| d.name.local_name.clone()).collect()
}

// =============================================================================
// Cycles
// =============================================================================

fn tree_schema() -> MemorySchemaIndex {
    MemorySchemaIndex::builder()
        .type_definition(
            TypeDefinition::complex(QName::local("TreeNode"))
                .with_element(ElementParticle::new(element("name", QName::xs("string"))))
                .with_element(
                    ElementParticle::new(element("children", QName::local("TreeNode")))
                        .with_occurs(Occurs::zero_or_more()),
                ),
        )
        .build()
}

#[test]
fn test_tree_node_children_resolve_to_outer_type() {
    let mut registry = registry_for(DefaultPolicy, tree_schema());

    let tree = registry.get_attribute_type(&QName::local("TreeNode")).unwrap();
    assert_eq!(tree.tag(), TypeTag::Complex);
    let outer = tree.descriptors().unwrap();
    assert_eq!(names(outer), vec!["name", "children"]);

    let children = &outer[1];
    assert!(children.type_ref.is_proxy());
    assert_eq!(children.occurs, Occurs::zero_or_more());

    let inner = children.type_ref.descriptors().unwrap();
    assert_eq!(inner.len(), 2);
    for (a, b) in inner.iter().zip(outer) {
        assert!(Arc::ptr_eq(a, b));
    }
    assert!(Arc::ptr_eq(
        &registry.get_attribute_type(&QName::local("TreeNode")).unwrap(),
        &tree
    ));
}

#[test]
fn test_mutual_recursion() {
    let index = MemorySchemaIndex::builder()
        .type_definition(
            TypeDefinition::complex(QName::local("Parent")).with_element(
                ElementParticle::new(element("child", QName::local("Child"))).with_occurs(Occurs::zero_or_more()),
            ),
        )
        .type_definition(
            TypeDefinition::complex(QName::local("Child")).with_element(
                ElementParticle::new(element("parent", QName::local("Parent"))).with_occurs(Occurs::optional()),
            ),
        )
        .build();
    let mut registry = registry_for(DefaultPolicy, index);

    let parent = registry.get_attribute_type(&QName::local("Parent")).unwrap();
    let child_ref = &parent.descriptors().unwrap()[0].type_ref;
    assert!(!child_ref.is_proxy());

    let child = registry.get_attribute_type(&QName::local("Child")).unwrap();
    assert!(child_ref.points_to(&child));

    let back = &child.descriptors().unwrap()[0].type_ref;
    assert!(back.is_proxy());
    assert!(back.points_to(&parent));
}

#[test]
fn test_dump_of_cyclic_type_is_finite() {
    let mut registry = registry_for(DefaultPolicy, tree_schema());
    let tree = registry.get_attribute_type(&QName::local("TreeNode")).unwrap();

    let summary = TypeSummary::of(&tree);
    assert_eq!(summary.descriptors.len(), 2);
    assert!(summary.descriptors[1].proxy);
    assert_eq!(summary.descriptors[1].type_name, "TreeNode");
    assert_eq!(summary.descriptors[1].max_occurs, None);
    assert!(summary.to_json().unwrap().contains("TreeNode"));
}

// =============================================================================
// Substitution groups
// =============================================================================

fn shapes_schema() -> MemorySchemaIndex {
    MemorySchemaIndex::builder()
        .type_definition(TypeDefinition::complex(QName::local("ShapeType")).abstract_type())
        .type_definition(
            TypeDefinition::complex(QName::local("DrawingType")).with_element(
                ElementParticle::new(ElementDeclaration::reference(QName::local("Shape")))
                    .with_occurs(Occurs::one_or_more()),
            ),
        )
        .element(element("Shape", QName::local("ShapeType")).abstract_element().nillable())
        .element(element("Circle", QName::local("ShapeType")).substitutes(QName::local("Shape")))
        .element(element("Square", QName::local("ShapeType")).substitutes(QName::local("Shape")))
        .build()
}

#[test]
fn test_substitution_group_of_top_level_element() {
    let mut registry = registry_for(DefaultPolicy, shapes_schema());

    let shape = registry
        .get_attribute_descriptor(&QName::local("Shape"), None)
        .unwrap();
    let group = shape.substitution_group().unwrap();
    assert_eq!(names(&group), vec!["Circle", "Square"]);
    for alternative in &group {
        assert_eq!(alternative.occurs.min, 0);
        assert_eq!(alternative.occurs.max, None);
        assert!(alternative.nillable);
        assert_eq!(alternative.type_ref.name(), &QName::local("ShapeType"));
    }
}

#[test]
fn test_substitution_group_is_computed_once() {
    let mut registry = registry_for(DefaultPolicy, shapes_schema());

    let first = registry
        .get_attribute_descriptor(&QName::local("Shape"), None)
        .unwrap();
    let before = first.substitution_group().unwrap();
    let second = registry
        .get_attribute_descriptor(&QName::local("Shape"), None)
        .unwrap();
    let after = second.substitution_group().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert!(Arc::ptr_eq(a, b));
    }
}

#[test]
fn test_substitution_group_of_child_uses_container_occurs() {
    let mut registry = registry_for(DefaultPolicy, shapes_schema());

    let drawing = registry.get_attribute_type(&QName::local("DrawingType")).unwrap();
    let shape = &drawing.descriptors().unwrap()[0];
    assert_eq!(shape.name, QName::local("Shape"));
    assert_eq!(shape.occurs, Occurs::one_or_more());

    let group = shape.substitution_group().unwrap();
    assert_eq!(names(&group), vec!["Circle", "Square"]);
    assert!(group.iter().all(|g| g.occurs == Occurs::one_or_more()));

    let circle = find_descriptor(&drawing, &QName::local("Circle")).unwrap();
    assert!(Arc::ptr_eq(&circle, &group[0]));
}

#[test]
fn test_substitution_group_reaches_registered_nested_type() {
    let index = MemorySchemaIndex::builder()
        .type_definition(
            TypeDefinition::complex(QName::local("OuterType"))
                .with_element(ElementParticle::new(element("inner", QName::local("InnerType")))),
        )
        .element(element("Shape", QName::xs("string")))
        .element(element("Circle", QName::xs("string")).substitutes(QName::local("Shape")))
        .element(element("Square", QName::xs("string")).substitutes(QName::local("Shape")))
        .build();
    let mut registry = registry_for(DefaultPolicy, index);

    // InnerType arrives prebuilt, without substitution groups on its children
    let inner_definition = TypeDefinition::complex(QName::local("InnerType"))
        .with_element(ElementParticle::new(ElementDeclaration::reference(QName::local("Shape"))));
    let string = registry.named_type(&QName::xs("string")).unwrap();
    let shape = Arc::new(PropertyDescriptor::new(
        QName::local("Shape"),
        TypeRef::Resolved(string),
        Occurs::once(),
    ));
    let inner = AttributeType::complex(QName::local("InnerType"), vec![shape.clone()]);
    inner
        .user_data
        .insert(TYPE_DEFINITION_KEY, UserValue::TypeDefinition(Arc::new(inner_definition)));
    let inner = Arc::new(inner);
    registry.register(inner.clone(), false);
    assert!(shape.substitution_group().is_none());

    let outer = registry.get_attribute_type(&QName::local("OuterType")).unwrap();
    assert!(outer.descriptors().unwrap()[0].type_ref.points_to(&inner));

    let group = shape.substitution_group().unwrap();
    assert_eq!(names(&group), vec!["Circle", "Square"]);
    assert!(group.iter().all(|g| g.occurs == Occurs::once()));
}

// =============================================================================
// Lookup failures
// =============================================================================

#[test]
fn test_unknown_type_not_found() {
    let mut registry = registry_for(DefaultPolicy, tree_schema());
    let unknown = QName::namespaced("urn:unknown", "Type");

    let err = registry.get_attribute_type(&unknown).unwrap_err();
    assert_eq!(err, Error::NotFound(unknown.clone()));
    assert_eq!(err.name(), Some(&unknown));

    // The failure leaves the registry usable
    assert!(registry.get_attribute_type(&QName::local("TreeNode")).is_ok());
}

#[test]
fn test_unknown_element_not_found() {
    let mut registry = registry_for(DefaultPolicy, tree_schema());
    let err = registry
        .get_attribute_descriptor(&QName::local("forest"), None)
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(registry.descriptor_count(), 0);
}

#[test]
fn test_missing_type_definition() {
    let index = MemorySchemaIndex::builder()
        .type_definition(
            TypeDefinition::complex(QName::local("Holder")).with_element(ElementParticle::new(
                ElementDeclaration::new(QName::local("broken"), ElementTypeRef::Missing),
            )),
        )
        .build();
    let mut registry = registry_for(DefaultPolicy, index);

    let err = registry.get_attribute_type(&QName::local("Holder")).unwrap_err();
    assert_eq!(err, Error::MissingTypeDefinition(QName::local("broken")));
    assert!(!registry.is_building(&QName::local("Holder")));
}

// =============================================================================
// Caches and descriptors
// =============================================================================

#[test]
fn test_anonymous_types_stay_out_of_named_cache() {
    let address = TypeDefinition::anonymous_complex()
        .with_element(ElementParticle::new(element("street", QName::xs("string"))));
    let index = MemorySchemaIndex::builder()
        .type_definition(
            TypeDefinition::complex(QName::local("Person")).with_element(ElementParticle::new(
                ElementDeclaration::anonymous(QName::local("address"), address).local(),
            )),
        )
        .build();
    let mut registry = registry_for(DefaultPolicy, index);

    let person = registry.get_attribute_type(&QName::local("Person")).unwrap();
    let address_ref = &person.descriptors().unwrap()[0].type_ref;
    assert_eq!(address_ref.name(), &QName::local("address"));

    let anonymous = registry.anonymous_type(&QName::local("address")).unwrap();
    assert!(address_ref.points_to(&anonymous));
    assert_eq!(registry.anonymous_types(), vec![QName::local("address")]);
    assert!(registry.named_type(&QName::local("address")).is_none());
    assert!(registry
        .get_attribute_type(&QName::local("address"))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_top_level_descriptor_defaults() {
    let index = MemorySchemaIndex::builder()
        .element(element("title", QName::xs("string")).with_default("untitled"))
        .build();
    let mut registry = registry_for(DefaultPolicy, index);

    let title = registry
        .get_attribute_descriptor(&QName::local("title"), None)
        .unwrap();
    assert_eq!(title.occurs, Occurs::new(0, None));
    assert_eq!(title.default_value.as_deref(), Some("untitled"));
    assert_eq!(title.type_ref.binding().unwrap(), Binding::String);
    assert!(title.user_data.element_declaration().is_some());
    assert_eq!(registry.descriptor_names(), vec![QName::local("title")]);
}

#[test]
fn test_element_reference_resolution() {
    let index = MemorySchemaIndex::builder()
        .element(element("title", QName::xs("string")).nillable())
        .type_definition(
            TypeDefinition::complex(QName::local("Book")).with_element(
                ElementParticle::new(ElementDeclaration::reference(QName::local("title")))
                    .with_occurs(Occurs::new(1, Some(3))),
            ),
        )
        .build();
    let mut registry = registry_for(DefaultPolicy, index);

    let book = registry.get_attribute_type(&QName::local("Book")).unwrap();
    let title = &book.descriptors().unwrap()[0];
    assert_eq!(title.name, QName::local("title"));
    assert_eq!(title.occurs, Occurs::new(1, Some(3)));
    assert!(title.nillable);
    assert_eq!(
        title.user_data.element_declaration().map(|e| e.is_global()),
        Some(true)
    );
}

#[test]
fn test_super_types_and_inherited_descriptors() {
    let base = Arc::new(
        TypeDefinition::complex(QName::local("Base"))
            .with_element(ElementParticle::new(element("id", QName::xs("ID")))),
    );
    let index = MemorySchemaIndex::builder()
        .shared_type(base.clone())
        .type_definition(
            TypeDefinition::complex(QName::local("Derived"))
                .extending(base)
                .with_element(ElementParticle::new(element("extra", QName::xs("int")))),
        )
        .type_definition(
            TypeDefinition::simple(QName::local("Code"))
                .restricting(TypeDefinition::builtin("token"))
                .with_facet("maxLength", "8"),
        )
        .build();
    let mut registry = registry_for(DefaultPolicy, index);

    let derived = registry.get_attribute_type(&QName::local("Derived")).unwrap();
    assert_eq!(names(derived.descriptors().unwrap()), vec!["id", "extra"]);
    let base = registry.named_type(&QName::local("Base")).unwrap();
    assert!(derived.super_type.as_ref().unwrap().points_to(&base));
    assert!(find_descriptor(&derived, &QName::local("id")).is_some());

    let code = registry.get_attribute_type(&QName::local("Code")).unwrap();
    assert_eq!(code.tag(), TypeTag::Simple);
    assert_eq!(code.restrictions.len(), 1);
    let token = registry.named_type(&QName::xs("token")).unwrap();
    assert!(code.super_type.as_ref().unwrap().points_to(&token));
    assert!(code.user_data.type_definition().is_some());
}

#[test]
fn test_attribute_uses_become_descriptors() {
    let index = MemorySchemaIndex::builder()
        .type_definition(
            TypeDefinition::complex(QName::local("Valve"))
                .with_element(ElementParticle::new(element("state", QName::xs("string"))))
                .with_attribute(AttributeUse::new(QName::local("gml_id")).required())
                .with_attribute(AttributeUse::new(QName::local("status"))),
        )
        .build();

    let mut plain = registry_for(DefaultPolicy, index);
    let valve = plain.get_attribute_type(&QName::local("Valve")).unwrap();
    assert_eq!(names(valve.descriptors().unwrap()), vec!["state"]);

    let index = MemorySchemaIndex::builder()
        .type_definition(
            TypeDefinition::complex(QName::local("Valve"))
                .with_element(ElementParticle::new(element("state", QName::xs("string"))))
                .with_attribute(AttributeUse::new(QName::local("gml_id")).required())
                .with_attribute(AttributeUse::new(QName::local("status"))),
        )
        .build();
    let mut registry = TypeRegistry::with_config(
        DefaultPolicy,
        RegistryConfig::default().with_include_attributes(true),
        &FoundationTypeCache::new(),
    )
    .unwrap();
    registry.add_schema(Arc::new(index));

    let valve = registry.get_attribute_type(&QName::local("Valve")).unwrap();
    let descriptors = valve.descriptors().unwrap();
    assert_eq!(names(descriptors), vec!["state", "@gml_id", "@status"]);
    assert_eq!(descriptors[1].occurs, Occurs::once());
    assert_eq!(descriptors[2].occurs, Occurs::optional());
}

// =============================================================================
// Features and geometries
// =============================================================================

#[derive(Debug, Default)]
struct GeoPolicy;

impl GeoPolicy {
    fn geometry() -> QName {
        QName::local("AbstractGeometryType")
    }

    fn feature() -> QName {
        QName::local("AbstractFeatureType")
    }
}

impl RegistryPolicy for GeoPolicy {
    fn is_feature_type(&self, definition: &TypeDefinition) -> bool {
        definition.derives_from(&Self::feature())
    }

    fn is_geometry_type(&self, definition: &TypeDefinition) -> bool {
        definition.derives_from(&Self::geometry())
    }

    fn binding_of(&self, definition: &TypeDefinition) -> Option<Binding> {
        match definition.name.as_ref().map(|n| n.local_name.as_str()) {
            Some("PointType") => Some(Binding::Geometry(GeometryKind::Point)),
            _ => None,
        }
    }
}

fn roads_schema() -> MemorySchemaIndex {
    let geometry = Arc::new(TypeDefinition::complex(GeoPolicy::geometry()).abstract_type());
    let feature = Arc::new(TypeDefinition::complex(GeoPolicy::feature()).abstract_type());
    MemorySchemaIndex::builder()
        .shared_type(geometry.clone())
        .shared_type(feature.clone())
        .type_definition(TypeDefinition::complex(QName::local("PointType")).extending(geometry))
        .type_definition(
            TypeDefinition::complex(QName::local("RoadType"))
                .extending(feature)
                .with_element(ElementParticle::new(element("name", QName::xs("string"))))
                .with_element(ElementParticle::new(element("centre", QName::local("PointType")))),
        )
        .element(element("Road", QName::local("RoadType")))
        .build()
}

#[test]
fn test_feature_type_with_default_geometry() {
    let mut registry = registry_for(GeoPolicy, roads_schema());
    let crs = Crs::epsg(4326);

    let road = registry
        .get_attribute_type_with(&QName::local("RoadType"), Some(&crs))
        .unwrap();
    assert_eq!(road.tag(), TypeTag::Feature);
    assert!(road.identified);
    assert_eq!(road.crs(), Some(&crs));

    let centre = road.default_geometry().unwrap();
    assert_eq!(centre.name, QName::local("centre"));
    assert!(centre.is_geometry());
    assert_eq!(
        centre.type_ref.binding().unwrap(),
        Binding::Geometry(GeometryKind::Point)
    );
    assert_eq!(centre.type_ref.crs().unwrap(), Some(crs));

    let super_type = road.super_type.as_ref().unwrap().resolve().unwrap();
    assert_eq!(super_type.tag(), TypeTag::Feature);
    assert!(super_type.abstract_type);
}

#[test]
fn test_feature_descriptor_from_element() {
    let mut registry = registry_for(GeoPolicy, roads_schema());

    let road = registry
        .get_attribute_descriptor(&QName::local("Road"), None)
        .unwrap();
    assert_eq!(road.type_ref.tag(), TypeTag::Feature);
    assert!(road.type_ref.default_geometry().unwrap().is_some());
    assert_eq!(road.type_ref.crs().unwrap(), None);
}

// =============================================================================
// Custom indexes
// =============================================================================

/// Index that decides occurrence and nillability itself instead of reading
/// them from the particles
#[derive(Debug)]
struct CatalogIndex {
    schema: MemorySchemaIndex,
}

impl SchemaIndex for CatalogIndex {
    fn find_element(&self, name: &QName) -> Option<Arc<ElementDeclaration>> {
        self.schema.find_element(name)
    }

    fn find_type(&self, name: &QName) -> Option<Arc<TypeDefinition>> {
        self.schema.find_type(name)
    }

    fn type_definitions(&self) -> Vec<Arc<TypeDefinition>> {
        self.schema.type_definitions()
    }

    fn substitution_group(&self, element: &ElementDeclaration) -> Vec<Arc<ElementDeclaration>> {
        self.schema.substitution_group(element)
    }

    fn min_occurs(&self, _container: &TypeDefinition, _element: &ElementDeclaration) -> u32 {
        7
    }

    fn max_occurs(&self, _container: &TypeDefinition, _element: &ElementDeclaration) -> Option<u32> {
        Some(9)
    }

    fn is_nillable(&self, _element: &ElementDeclaration) -> bool {
        true
    }
}

#[test]
fn test_custom_index_answers_for_its_types() {
    let catalog = CatalogIndex {
        schema: MemorySchemaIndex::builder()
            .type_definition(
                TypeDefinition::complex(QName::local("EntryType"))
                    .with_element(ElementParticle::new(element("code", QName::xs("string")).local())),
            )
            .build(),
    };
    let mut registry =
        TypeRegistry::with_config(DefaultPolicy, RegistryConfig::default(), &FoundationTypeCache::new()).unwrap();
    registry.add_schema(Arc::new(catalog));

    let entry = registry.get_attribute_type(&QName::local("EntryType")).unwrap();
    let code = &entry.descriptors().unwrap()[0];
    assert_eq!(code.name, QName::local("code"));
    assert_eq!(code.occurs, Occurs::new(7, Some(9)));
    assert!(code.nillable);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_dispose_releases_indexes() {
    let index = Arc::new(tree_schema());
    let mut registry =
        TypeRegistry::with_config(DefaultPolicy, RegistryConfig::default(), &FoundationTypeCache::new())
            .unwrap();
    registry.add_schema(index.clone());
    let tree = registry.get_attribute_type(&QName::local("TreeNode")).unwrap();

    registry.dispose();
    assert!(registry.is_disposed());
    assert!(index.is_empty());

    // Types built before disposal stay usable
    assert_eq!(tree.descriptors().unwrap()[1].type_ref.descriptors().unwrap().len(), 2);
}

#[test]
fn test_drop_leaves_shared_index_to_caller() {
    let index = Arc::new(shapes_schema());
    let foundation = FoundationTypeCache::new();
    let mut second = TypeRegistry::with_config(DefaultPolicy, RegistryConfig::default(), &foundation).unwrap();
    second.add_schema(index.clone());
    {
        let mut first = TypeRegistry::with_config(DefaultPolicy, RegistryConfig::default(), &foundation).unwrap();
        first.add_schema(index.clone());
        first.get_attribute_type(&QName::local("DrawingType")).unwrap();
    }

    assert!(!index.is_empty());
    let drawing = second.get_attribute_type(&QName::local("DrawingType")).unwrap();
    assert_eq!(names(drawing.descriptors().unwrap()), vec!["Shape"]);
}

#[test]
fn test_proxies_fail_once_registry_is_dropped() {
    let tree = {
        let mut registry = registry_for(DefaultPolicy, tree_schema());
        registry.get_attribute_type(&QName::local("TreeNode")).unwrap()
    };

    let children = &tree.descriptors().unwrap()[1];
    assert!(children.type_ref.is_proxy());
    assert_eq!(
        children.type_ref.descriptors().unwrap_err(),
        Error::CacheReleased(QName::local("TreeNode"))
    );
}
