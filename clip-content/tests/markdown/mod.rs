mod flavors;
